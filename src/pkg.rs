//! Installation packages.
//!
//! A package is a directory holding everything needed to install one BW
//! application:
//!
//! ```text
//! orders/
//!   package-info          descriptor (appname, archive, hooks)
//!   orders.ear            the application archive
//!   envconfig/
//!     BWDEV.xml           deployment configuration per target domain
//!     default.xml         fallback configuration
//!   hooks/
//!     prepare.sh          run before upload
//!     complete.sh         run after upload/deploy
//! ```
//!
//! The archive and the XML configuration documents are opaque to this
//! crate; they are passed by path to the vendor tool.

pub use self::info::*;
pub use self::scaffold::*;

mod info;
mod scaffold;
