use dispatch_core::driver::DriverId;

/// Result of running the full five-wave broadcast for one Job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Assigned { driver_id: DriverId },
    Exhausted,
}
