use serde::{Deserialize, Serialize};

/// The closed set of operator tags a graph document's node `type` may
/// carry. Unknown strings are a `GraphShape` error at validation time,
/// never reach dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Source,
    SourceCsv,
    Transform,
    TypeConvert,
    FillNa,
    Deduplicate,
    TextProcess,
    DateProcess,
    GroupAggregate,
    Pivot,
    Unpivot,
    Join,
    Concat,
    Vlookup,
    Diff,
    Reconcile,
    Code,
    LlmRow,
    Output,
    OutputCsv,
}

impl NodeKind {
    /// Number of inbound edges this kind requires.
    pub fn arity(self) -> Arity {
        use NodeKind::*;
        match self {
            Source | SourceCsv => Arity::Exact(0),
            Transform | TypeConvert | FillNa | Deduplicate | TextProcess | DateProcess
            | GroupAggregate | Pivot | Unpivot | Code | LlmRow | Output | OutputCsv => {
                Arity::Exact(1)
            }
            Join | Vlookup | Diff | Reconcile => Arity::Exact(2),
            Concat => Arity::AtLeast(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        use NodeKind::*;
        match self {
            Source => "source",
            SourceCsv => "source_csv",
            Transform => "transform",
            TypeConvert => "type_convert",
            FillNa => "fill_na",
            Deduplicate => "deduplicate",
            TextProcess => "text_process",
            DateProcess => "date_process",
            GroupAggregate => "group_aggregate",
            Pivot => "pivot",
            Unpivot => "unpivot",
            Join => "join",
            Concat => "concat",
            Vlookup => "vlookup",
            Diff => "diff",
            Reconcile => "reconcile",
            Code => "code",
            LlmRow => "llm_row",
            Output => "output",
            OutputCsv => "output_csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}
