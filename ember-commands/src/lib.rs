pub mod profile;

use ember_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    profile::setfid::META,
    profile::setlocation::META,
    profile::settrap::META,
    profile::setavatar::META,
    profile::view::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        profile::setfid::setfid(),
        profile::setlocation::setlocation(),
        profile::settrap::settrap(),
        profile::setavatar::setavatar(),
        profile::view::profile(),
    ]
}
