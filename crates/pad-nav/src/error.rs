use thiserror::Error;

/// Ways a maneuver can end without reaching its goal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ManeuverError {
    #[error("maneuver timed out after {elapsed_s:.1}s")]
    Timeout { elapsed_s: f64 },

    #[error("maneuver aborted")]
    Aborted,

    #[error("land not confirmed after {attempts} attempts")]
    LandingUnconfirmed { attempts: u32 },
}
