//! Operation taxonomy.
//!
//! Every operation a backing store exposes classifies into exactly one of two
//! disjoint families: reads that may be served from cache and writes that must
//! invalidate it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read operations eligible for caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReadOperation {
    FindUnique,
    FindUniqueOrThrow,
    FindFirst,
    FindFirstOrThrow,
    FindMany,
    Count,
    Aggregate,
    GroupBy,
    FindRaw,
    AggregateRaw,
    QueryRaw,
}

impl ReadOperation {
    pub const ALL: [ReadOperation; 11] = [
        ReadOperation::FindUnique,
        ReadOperation::FindUniqueOrThrow,
        ReadOperation::FindFirst,
        ReadOperation::FindFirstOrThrow,
        ReadOperation::FindMany,
        ReadOperation::Count,
        ReadOperation::Aggregate,
        ReadOperation::GroupBy,
        ReadOperation::FindRaw,
        ReadOperation::AggregateRaw,
        ReadOperation::QueryRaw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadOperation::FindUnique => "findUnique",
            ReadOperation::FindUniqueOrThrow => "findUniqueOrThrow",
            ReadOperation::FindFirst => "findFirst",
            ReadOperation::FindFirstOrThrow => "findFirstOrThrow",
            ReadOperation::FindMany => "findMany",
            ReadOperation::Count => "count",
            ReadOperation::Aggregate => "aggregate",
            ReadOperation::GroupBy => "groupBy",
            ReadOperation::FindRaw => "findRaw",
            ReadOperation::AggregateRaw => "aggregateRaw",
            ReadOperation::QueryRaw => "queryRaw",
        }
    }
}

/// Write operations that invalidate cached reads on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WriteOperation {
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Upsert,
    Delete,
    DeleteMany,
    ExecuteRaw,
}

impl WriteOperation {
    pub const ALL: [WriteOperation; 8] = [
        WriteOperation::Create,
        WriteOperation::CreateMany,
        WriteOperation::Update,
        WriteOperation::UpdateMany,
        WriteOperation::Upsert,
        WriteOperation::Delete,
        WriteOperation::DeleteMany,
        WriteOperation::ExecuteRaw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WriteOperation::Create => "create",
            WriteOperation::CreateMany => "createMany",
            WriteOperation::Update => "update",
            WriteOperation::UpdateMany => "updateMany",
            WriteOperation::Upsert => "upsert",
            WriteOperation::Delete => "delete",
            WriteOperation::DeleteMany => "deleteMany",
            WriteOperation::ExecuteRaw => "executeRaw",
        }
    }
}

/// An operation identifier, tagged by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperationKind {
    Read(ReadOperation),
    Write(WriteOperation),
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Read(op) => op.as_str(),
            OperationKind::Write(op) => op.as_str(),
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, OperationKind::Read(_))
    }

    pub fn is_write(self) -> bool {
        matches!(self, OperationKind::Write(_))
    }
}

impl From<ReadOperation> for OperationKind {
    fn from(op: ReadOperation) -> Self {
        OperationKind::Read(op)
    }
}

impl From<WriteOperation> for OperationKind {
    fn from(op: WriteOperation) -> Self {
        OperationKind::Write(op)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation `{0}`")]
pub struct UnknownOperation(pub String);

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(op) = ReadOperation::ALL.iter().find(|op| op.as_str() == value) {
            return Ok(OperationKind::Read(*op));
        }
        if let Some(op) = WriteOperation::ALL.iter().find(|op| op.as_str() == value) {
            return Ok(OperationKind::Write(*op));
        }
        // `executeRawUnsafe` is the legacy name for raw writes.
        if value == "executeRawUnsafe" {
            return Ok(OperationKind::Write(WriteOperation::ExecuteRaw));
        }
        Err(UnknownOperation(value.to_string()))
    }
}

impl TryFrom<String> for OperationKind {
    type Error = UnknownOperation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperationKind> for String {
    fn from(op: OperationKind) -> Self {
        op.as_str().to_string()
    }
}
