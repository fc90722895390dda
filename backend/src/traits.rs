use crate::resources::{derive_status, Condition, ResourceStatus};

pub trait HasConditions {
    fn conditions(&self) -> &[Condition];

    fn derived_status(&self) -> ResourceStatus {
        derive_status(self.conditions())
    }
}
