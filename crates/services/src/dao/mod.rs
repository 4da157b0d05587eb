pub mod apartment;
pub mod base;
pub mod invite;
pub mod membership;
pub mod user;

pub use apartment::ApartmentDao;
pub use base::{BaseDao, DaoError, DaoResult};
pub use invite::InviteDao;
pub use membership::{MembershipDao, MembershipWrite};
pub use user::UserDao;
