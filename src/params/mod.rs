//! Current parameters and read tracking.
//!
//! A snapshot is the [`ParamMap`](crate::ParamMap) of the current URL,
//! rebuilt whenever the search string changes. Subscribers read it through
//! a [`Params`] accessor, which fills in the subscriber's [`ReadSet`]; on
//! navigation the read-set is compared against the new snapshot to decide
//! whether the subscriber must refresh.

mod accessor;
mod snapshot;
mod tracking;

pub use accessor::Params;
pub use snapshot::{current_snapshot, derive_params};
pub use tracking::{PauseGuard, ReadSet, Tracker};
