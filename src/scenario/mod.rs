//! The scenario ledger: every observed call in order, with its verification
//! status, and the assertions that consume it.

pub mod ledger;
pub mod report;

pub use ledger::{
    EntryId, ObservedInvocation, Outcome, Scenario, ScenarioEntry, VerificationStatus,
};
pub use report::{DefaultScenarioReport, ScenarioReport, format_value};
