#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    MalformedSpan,
    NestedTable,
    NotGenuine,
    Unplaceable,
    NoGenuineTables,
}

impl WarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedSpan => "malformed_span",
            Self::NestedTable => "nested_table",
            Self::NotGenuine => "not_genuine",
            Self::Unplaceable => "unplaceable",
            Self::NoGenuineTables => "no_genuine_tables",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractWarning {
    pub code: WarningCode,
    pub message: String,
    pub table_id: Option<usize>,
}

impl ExtractWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table_id: None,
        }
    }

    #[must_use]
    pub fn with_table_id(mut self, table_id: usize) -> Self {
        self.table_id = Some(table_id);
        self
    }
}
