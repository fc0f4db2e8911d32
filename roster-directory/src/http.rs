//! ureq plumbing shared by the token exchange and the directory client.

use roster_core::DirectoryError;

pub use roster_core::http::agent;

pub(crate) fn ureq_error(err: ureq::Error) -> DirectoryError {
    match err {
        ureq::Error::Status(status, response) => DirectoryError::Http {
            status,
            message: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => DirectoryError::Transport(transport.to_string()),
    }
}
