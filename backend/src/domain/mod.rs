//! Domain primitives, storage vocabulary and coordinators.
//!
//! Purpose: keep several independently-partitioned views of the same logical
//! entities mutually consistent over a store with no cross-partition
//! transactions. The coordinators here depend only on the driven ports in
//! [`ports`]; they do not depend on each other and are composed by an outer
//! caller.
//!
//! Public surface:
//! - Entities and value types (`User`, `Video`, `Email`, `Tag`, ...).
//! - Storage rows and keys ([`tables`]) shared with the table store port.
//! - The coordinators: [`RegistrationService`], [`LoginService`] and
//!   [`VideoCatalogService`].

pub mod credentials;
pub mod error;
mod login_service;
pub mod ports;
mod registration_service;
mod store_error_mapping;
pub mod tables;
pub mod user;
pub mod video;
mod video_catalog_service;

pub use self::credentials::{CredentialValidationError, Password, PasswordHash, UserCredentials};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::login_service::LoginService;
pub use self::registration_service::{RegistrationOutcome, RegistrationService};
pub use self::user::{Email, User, UserDraft, UserValidationError};
pub use self::video::{
    DayBucket, LatestVideo, Tag, UserVideo, Video, VideoByTag, VideoDraft, VideoUpdate,
    VideoValidationError,
};
pub use self::video_catalog_service::VideoCatalogService;

/// Convenient result alias for coordinator operations.
///
/// # Examples
/// ```
/// use reelvault_backend::domain::{DomainResult, Error};
///
/// fn check() -> DomainResult<()> {
///     Err(Error::invalid_request("nope"))
/// }
/// ```
pub type DomainResult<T> = Result<T, Error>;
