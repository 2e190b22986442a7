/// One community member's stored profile.
///
/// Rows come into existence on the first field write; every column other
/// than the key is optional and set independently.
#[derive(Clone, Debug)]
pub struct Profile {
    pub owner_id: u64,
    pub fid: Option<i64>,
    pub location_x: Option<i64>,
    pub location_y: Option<i64>,
    pub trap_note: Option<String>,
    pub avatar_url: Option<String>,
    pub skip_link_prompt: bool,
}

/// Partial update for a profile row. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub fid: Option<i64>,
    pub location_x: Option<i64>,
    pub location_y: Option<i64>,
    pub trap_note: Option<String>,
    pub avatar_url: Option<String>,
}
