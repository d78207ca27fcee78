//! Pure fold of key-store commands into per-subject aggregates.

use shroud_types::{KmsCommand, SubjectKeyAggregate};
use tracing::{debug, info};

/// Folds one command into the current aggregate.
///
/// `Register` is idempotent: only the first registration for a subject
/// takes effect, which linearizes competing creations through the log.
/// `Forget` erases all materials; past ciphertexts for the subject
/// become undecipherable.
pub fn apply_command(current: &SubjectKeyAggregate, command: &KmsCommand) -> SubjectKeyAggregate {
    match command {
        KmsCommand::Register { material } => {
            if current.is_empty() {
                current.registered(material.clone())
            } else {
                info!(
                    subject = %current.subject(),
                    "key already present for subject, no key versioning implemented"
                );
                current.clone()
            }
        }
        KmsCommand::Forget => {
            debug!(subject = %current.subject(), "erasing key material for subject");
            current.forgotten()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_types::{SubjectId, SymmetricMaterial};

    fn subject() -> SubjectId {
        SubjectId::new("U1").unwrap()
    }

    fn material() -> SymmetricMaterial {
        SymmetricMaterial::new("AES", vec![7; 32])
    }

    #[test]
    fn register_on_empty_sets_material() {
        let current = SubjectKeyAggregate::empty(subject());
        let m = material();
        let next = apply_command(&current, &KmsCommand::Register { material: m.clone() });
        assert_eq!(next.materials(), &[m]);
    }

    #[test]
    fn register_on_existing_is_a_no_op() {
        let first = material();
        let current = SubjectKeyAggregate::with_material(subject(), first.clone());
        let next = apply_command(
            &current,
            &KmsCommand::Register {
                material: material(),
            },
        );
        assert_eq!(next.materials(), &[first], "first registration must win");
    }

    #[test]
    fn forget_erases_materials() {
        let current = SubjectKeyAggregate::with_material(subject(), material());
        let next = apply_command(&current, &KmsCommand::Forget);
        assert!(next.is_empty());
    }

    #[test]
    fn forget_on_empty_stays_empty() {
        let current = SubjectKeyAggregate::empty(subject());
        assert!(apply_command(&current, &KmsCommand::Forget).is_empty());
    }

    #[test]
    fn replay_is_idempotent() {
        let m = material();
        let commands = [
            KmsCommand::Register { material: m.clone() },
            KmsCommand::Register {
                material: material(),
            },
            KmsCommand::Forget,
            KmsCommand::Register {
                material: material(),
            },
        ];

        let fold_all = || {
            commands.iter().fold(
                SubjectKeyAggregate::empty(subject()),
                |acc, cmd| apply_command(&acc, cmd),
            )
        };

        assert_eq!(fold_all(), fold_all());
    }
}
