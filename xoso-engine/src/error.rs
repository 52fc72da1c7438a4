/// Which of the two pasted tables a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// The draw being analyzed.
    Draw,
    /// The later draw used to check a prediction.
    Actual,
}

impl TableKind {
    fn empty_message(&self) -> &'static str {
        match self {
            TableKind::Draw => "Dữ liệu không được để trống.",
            TableKind::Actual => "Dữ liệu đối chiếu không được để trống.",
        }
    }

    fn header_message(&self) -> &'static str {
        match self {
            TableKind::Draw => {
                "Định dạng dữ liệu không đúng. Phải có \"Đầu Đuôi\" ở dòng đầu."
            }
            TableKind::Actual => {
                "Định dạng dữ liệu đối chiếu không đúng. Phải có \"Đầu Đuôi\" ở dòng đầu."
            }
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{}", .kind.empty_message())]
    Empty { kind: TableKind },
    #[error("{}", .kind.header_message())]
    MissingHeader { kind: TableKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        let err = FormatError::Empty { kind: TableKind::Draw };
        assert_eq!(err.to_string(), "Dữ liệu không được để trống.");

        let err = FormatError::MissingHeader { kind: TableKind::Actual };
        assert!(err.to_string().starts_with("Định dạng dữ liệu đối chiếu"));
        assert!(err.to_string().contains("\"Đầu Đuôi\""));
    }
}
