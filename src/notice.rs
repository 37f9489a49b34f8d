use std::fmt;

/// Transient, user-facing notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Welcome,
    Farewell,
    NeedInternet,
    SignInFailed(String),
    SessionFinalized,
    SignOutFailed,
    QueryFailed,
    DeleteFailed,
    ProductAdded,
    ProductUpdated,
    InsertFailed,
    UpdateFailed,
    UploadFailed,
    InvalidInput(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Welcome => write!(f, "Welcome"),
            Notice::Farewell => write!(f, "See you around"),
            Notice::NeedInternet => write!(f, "You need internet"),
            Notice::SignInFailed(code) => write!(f, "Error code {}", code),
            Notice::SessionFinalized => write!(f, "Session finalized"),
            Notice::SignOutFailed => write!(f, "There was an error"),
            Notice::QueryFailed => write!(f, "Error querying data"),
            Notice::DeleteFailed => write!(f, "There was an error"),
            Notice::ProductAdded => write!(f, "Product added"),
            Notice::ProductUpdated => write!(f, "Product updated"),
            Notice::InsertFailed => write!(f, "Error inserting product"),
            Notice::UpdateFailed => write!(f, "Error updating product"),
            Notice::UploadFailed => write!(f, "Error uploading image"),
            Notice::InvalidInput(reason) => write!(f, "Invalid input: {}", reason),
        }
    }
}
