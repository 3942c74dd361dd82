//! Configuration module

mod site;

pub use site::FeedConfig;
pub use site::HighlightConfig;
pub use site::Profile;
pub use site::ProfileKind;
pub use site::SiteConfig;
pub use site::SocialConfig;
