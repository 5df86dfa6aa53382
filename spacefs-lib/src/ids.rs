pub const UID_SIZE: usize = 16;
pub const UID_ALPHABET: [char; 63] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    '_'
];

/// opaque id of a file or folder. the store hands out uuid strings so the
/// client never tries to interpret it.
pub type EntryId = String;

/// id of the user that owns a personal space entry
pub type OwnerId = i64;

pub fn create_uid() -> EntryId {
    nanoid::format(nanoid::rngs::default, &UID_ALPHABET, UID_SIZE)
}
