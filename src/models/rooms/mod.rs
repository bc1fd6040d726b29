pub mod entities;
pub mod requests;

pub use entities::Room;
pub use requests::{CreateRoomRequest, RoomQueryParams, UpdateRoomRequest};
