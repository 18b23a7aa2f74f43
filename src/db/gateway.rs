use crate::error::Result;
use crate::models::{
    BandMember, MemberPatch, SchedulePatch, Song, SongPatch, SundaySchedule,
};

/// Uniform contract over the backing stores. The entity store talks only to
/// this trait, so it never knows whether rows live in SQLite or in the local
/// JSON document.
///
/// Missing identifiers are not errors: `update_*` answers `Ok(None)` and
/// `delete_*` answers `Ok(false)`.
pub trait PersistenceGateway {
    /// Every song, in storage order.
    fn list_songs(&self) -> Result<Vec<Song>>;
    fn insert_song(&mut self, song: &Song) -> Result<()>;
    fn update_song(&mut self, id: &str, patch: &SongPatch) -> Result<Option<Song>>;
    /// Also drops the song's schedule placements.
    fn delete_song(&mut self, id: &str) -> Result<bool>;

    /// Every member with their availability records resolved.
    fn list_members(&self) -> Result<Vec<BandMember>>;
    fn insert_member(&mut self, member: &BandMember) -> Result<()>;
    fn update_member(&mut self, id: &str, patch: &MemberPatch) -> Result<Option<BandMember>>;
    /// Also drops the member's availability and schedule placements.
    fn delete_member(&mut self, id: &str) -> Result<bool>;

    /// Every schedule with its song and band placements resolved.
    fn list_schedules(&self) -> Result<Vec<SundaySchedule>>;
    fn insert_schedule(&mut self, schedule: &SundaySchedule) -> Result<()>;
    fn update_schedule(
        &mut self,
        id: &str,
        patch: &SchedulePatch,
    ) -> Result<Option<SundaySchedule>>;
    fn delete_schedule(&mut self, id: &str) -> Result<bool>;
}
