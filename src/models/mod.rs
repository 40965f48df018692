pub mod analysis;
pub mod enums;
pub mod match_record;
pub mod position;

pub use analysis::*;
pub use match_record::*;
pub use position::*;
