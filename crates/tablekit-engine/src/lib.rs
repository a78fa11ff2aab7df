mod document;
mod report;
mod runner;
mod scheduler;
mod validator;

pub use document::{Edge, GraphDocument, Node};
pub use report::{NodeResult, NodeStatus, RunReport, TablePreview, PREVIEW_ROW_LIMIT};
pub use runner::run;
pub use scheduler::{schedule, Plan};
pub use validator::validate;

pub use tablekit_ops::{CodeExecutionPolicy, OpContext};
