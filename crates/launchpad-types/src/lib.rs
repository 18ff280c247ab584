//! Shared type definitions for the Launchpad startup simulation.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the Launchpad workspace. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the browser front-end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for runtime identities
//! - [`enums`] -- Closed vocabularies (resources, rarities, tiers, grades)
//! - [`records`] -- Audit and history records (transactions, skill use, performance)

pub mod enums;
pub mod ids;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ChallengeType, ComplexityTier, DecisionQuality, DifficultyAction, EventCategory, Rarity,
    ResourceKind, ResourceStatus, SkillLevel, Trend, UnknownVariant, WeakArea,
};
pub use ids::{PlayerId, SessionId};
pub use records::{PerformanceRecord, ResourceMap, ResourceTransaction, SkillUseRecord};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files under `bindings/` relative to the crate
        // root when `export_all` runs.
        use ts_rs::TS;

        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::SessionId::export_all();

        let _ = crate::enums::ResourceKind::export_all();
        let _ = crate::enums::ResourceStatus::export_all();
        let _ = crate::enums::EventCategory::export_all();
        let _ = crate::enums::Rarity::export_all();
        let _ = crate::enums::DecisionQuality::export_all();
        let _ = crate::enums::ChallengeType::export_all();
        let _ = crate::enums::WeakArea::export_all();
        let _ = crate::enums::ComplexityTier::export_all();
        let _ = crate::enums::SkillLevel::export_all();
        let _ = crate::enums::Trend::export_all();
        let _ = crate::enums::DifficultyAction::export_all();

        let _ = crate::records::ResourceTransaction::export_all();
        let _ = crate::records::SkillUseRecord::export_all();
        let _ = crate::records::PerformanceRecord::export_all();
    }
}
