use tracing::{info, warn};

use super::{reorder_plan, sort_for_display, EntityStore};
use crate::error::Result;
use crate::models::{new_id, NewSong, Song, SongPatch};

impl EntityStore {
    /// Every song in display order.
    pub fn songs(&self) -> Result<Vec<Song>> {
        let mut songs = self.gateway.list_songs()?;
        sort_for_display(&mut songs);
        Ok(songs)
    }

    pub fn create_song(&mut self, draft: NewSong) -> Result<Song> {
        let song = draft.into_song(new_id());
        self.gateway.insert_song(&song)?;
        info!(song_id = %song.id, name = %song.name, "song created");
        Ok(song)
    }

    /// Shallow merge into an existing song; `None` when the id is unknown.
    pub fn update_song(&mut self, id: &str, patch: &SongPatch) -> Result<Option<Song>> {
        let updated = self.gateway.update_song(id, patch)?;
        match &updated {
            Some(_) => info!(song_id = %id, "song updated"),
            None => warn!(song_id = %id, "song update skipped: not found"),
        }
        Ok(updated)
    }

    pub fn delete_song(&mut self, id: &str) -> Result<bool> {
        let deleted = self.gateway.delete_song(id)?;
        if deleted {
            info!(song_id = %id, "song deleted");
        } else {
            warn!(song_id = %id, "song delete skipped: not found");
        }
        Ok(deleted)
    }

    /// Give the listed songs orders `0..k` and push every other song after
    /// them, then return the new display order.
    pub fn reorder_songs(&mut self, ids: &[String]) -> Result<Vec<Song>> {
        let current = self.songs()?;
        for (id, order) in reorder_plan(&current, ids) {
            let patch = SongPatch {
                order: Some(order),
                ..SongPatch::default()
            };
            self.gateway.update_song(&id, &patch)?;
        }
        info!(count = current.len(), "songs reordered");
        self.songs()
    }
}
