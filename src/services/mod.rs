// Business logic services

pub mod audit_service;
pub mod exercise_library_service;
pub mod plan_generation_service;
pub mod plan_service;
pub mod profile_service;
pub mod safety_config_service;

pub use audit_service::AuditService;
pub use exercise_library_service::ExerciseLibraryService;
pub use plan_generation_service::{PlanGenerationService, PlanOutcome, PlanWarning};
pub use plan_service::PlanService;
pub use profile_service::ProfileService;
pub use safety_config_service::{ConfigSource, LoadedConfig, SafetyConfigService};
