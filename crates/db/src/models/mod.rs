pub mod apartment;
pub mod invite;
pub mod membership;
pub mod user;

pub use apartment::Apartment;
pub use invite::InviteCode;
pub use membership::{Membership, MembershipRole};
pub use user::User;
