//! Sorting: target ordering, move planning and plan execution.

pub mod execute;
pub mod plan;

pub use execute::{execute_plan, ExecutionReport};
pub use plan::{plan_moves, target_order, Move, Plan, PlanError, SimulatedLayout};
