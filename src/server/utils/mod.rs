pub mod mime_utils;
pub mod player_utils;
pub mod playlist_utils;
