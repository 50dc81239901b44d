mod content;
mod logs;
mod time_range;

pub use content::*;
pub use logs::*;
pub use time_range::*;
