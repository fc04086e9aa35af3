//! Terminal output for store results
use setlist_store::{Playlist, Song, SyncReport};

pub fn print_playlists(playlists: &[Playlist]) {
    if playlists.is_empty() {
        println!("No playlists");
        return;
    }

    println!("Playlists:");
    for playlist in playlists {
        let songs = playlist
            .songs
            .as_ref()
            .map(|songs| format!(" ({} songs)", songs.len()))
            .unwrap_or_default();
        let linked = if playlist.is_linked() { " [linked]" } else { "" };
        println!("  {} - {}{}{}", playlist.id, playlist.name, songs, linked);
    }
}

pub fn print_playlist(playlist: &Playlist) {
    println!("{} - {}", playlist.id, playlist.name);
    if let Some(description) = &playlist.description {
        println!("  {description}");
    }
    println!("  Updated: {}", playlist.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(synced) = playlist.last_synced_at {
        println!("  Last synced: {}", synced.format("%Y-%m-%d %H:%M"));
    }

    match &playlist.songs {
        Some(songs) if songs.is_empty() => println!("  (empty)"),
        Some(songs) => {
            for (position, song) in songs.iter().enumerate() {
                println!("  {:>3}. {}", position + 1, describe_song(song));
            }
        }
        None => {}
    }
}

pub fn print_songs(songs: &[Song]) {
    if songs.is_empty() {
        println!("No songs found");
        return;
    }
    for song in songs {
        println!("  {}", describe_song(song));
    }
}

pub fn print_report(report: &SyncReport) {
    println!(
        "{}",
        report.message.as_deref().unwrap_or("Sync complete")
    );
    if let Some(count) = report.playlists_count {
        println!("  Playlists: {count}");
    }
    for (key, value) in &report.extra {
        println!("  {key}: {value}");
    }
}

fn describe_song(song: &Song) -> String {
    let id = song
        .id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let unavailable = if song.is_available == Some(false) {
        " (unavailable)"
    } else {
        ""
    };
    format!(
        "[{id}] {} - {} ({}) #{}{unavailable}",
        song.artist, song.title, song.album, song.remote_track_id
    )
}
