//! TypeScript binding generation.
//!
//! ```text
//! ClassModel → plan_members → TsEmitter → reflow → <Class>.ts
//! ```

mod emit;
mod overload;
mod reflow;
mod types;

pub use emit::{GeneratedFile, TsEmitter, DEFAULT_BRIDGE_MODULE, INCOMPLETE_MARKER};
pub use overload::{
    lower_leading_capitals, plan_members, DropReason, MemberPlan, OverloadGroup, SetterAccessor,
    UnresolvedOverload,
};
pub use reflow::reflow;
pub use types::{map_type, parse_generic_args, sanitize_identifier, TsType};
