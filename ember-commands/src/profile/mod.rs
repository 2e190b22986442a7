pub mod reconcile;
pub mod setavatar;
pub mod setfid;
pub mod setlocation;
pub mod settrap;
pub mod view;
