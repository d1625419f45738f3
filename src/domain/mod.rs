mod expense;
mod integrity;
mod ledger;
mod money;
mod settlement;

pub use expense::*;
pub use integrity::*;
pub use ledger::*;
pub use money::*;
pub use settlement::*;
