//! Magic-number signature table.
//!
//! A small, internal replacement for libmagic covering the formats in the
//! extension table. Text formats (txt, csv, source code, svg) have no
//! signature and are left to the extension lookup.

use super::Category;

/// Number of header bytes needed to evaluate every signature
/// (the tar magic sits at offset 257).
pub const SIGNATURE_LEN: usize = 262;

/// A recognized signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureMatch {
    /// Short format name, for logs
    pub format: &'static str,
    pub category: Category,
    /// Extensions of formats built on top of this container (ZIP underlies
    /// docx/xlsx/pptx/odt). A file carrying one of these extensions keeps
    /// the extension's category.
    pub refined_by: &'static [&'static str],
}

impl SignatureMatch {
    const fn new(format: &'static str, category: Category) -> Self {
        Self {
            format,
            category,
            refined_by: &[],
        }
    }
}

struct Magic {
    offset: usize,
    bytes: &'static [u8],
    found: SignatureMatch,
}

const fn magic(offset: usize, bytes: &'static [u8], found: SignatureMatch) -> Magic {
    Magic {
        offset,
        bytes,
        found,
    }
}

const ZIP: SignatureMatch = SignatureMatch {
    format: "zip",
    category: Category::Archives,
    refined_by: &["docx", "xlsx", "pptx", "odt"],
};

const FIXED: &[Magic] = &[
    magic(0, b"\x89PNG\r\n\x1a\n", SignatureMatch::new("png", Category::Images)),
    magic(0, b"\xff\xd8\xff", SignatureMatch::new("jpeg", Category::Images)),
    magic(0, b"GIF87a", SignatureMatch::new("gif", Category::Images)),
    magic(0, b"GIF89a", SignatureMatch::new("gif", Category::Images)),
    magic(0, b"II*\x00", SignatureMatch::new("tiff", Category::Images)),
    magic(0, b"MM\x00*", SignatureMatch::new("tiff", Category::Images)),
    magic(0, b"%PDF-", SignatureMatch::new("pdf", Category::Documents)),
    magic(
        0,
        b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1",
        SignatureMatch::new("ole2", Category::Documents),
    ),
    magic(0, b"{\\rtf", SignatureMatch::new("rtf", Category::Documents)),
    magic(0, b"PK\x03\x04", ZIP),
    magic(0, b"PK\x05\x06", ZIP),
    magic(0, b"Rar!\x1a\x07", SignatureMatch::new("rar", Category::Archives)),
    magic(
        0,
        b"7z\xbc\xaf\x27\x1c",
        SignatureMatch::new("7z", Category::Archives),
    ),
    magic(0, b"\x1f\x8b", SignatureMatch::new("gzip", Category::Archives)),
    magic(0, b"BZh", SignatureMatch::new("bzip2", Category::Archives)),
    magic(
        0,
        b"\xfd7zXZ\x00",
        SignatureMatch::new("xz", Category::Archives),
    ),
    magic(257, b"ustar", SignatureMatch::new("tar", Category::Archives)),
    magic(0, b"ID3", SignatureMatch::new("mp3", Category::Audio)),
    magic(0, b"fLaC", SignatureMatch::new("flac", Category::Audio)),
    magic(0, b"OggS", SignatureMatch::new("ogg", Category::Audio)),
    magic(0, b"MThd", SignatureMatch::new("midi", Category::Audio)),
    magic(
        0,
        b"\x1a\x45\xdf\xa3",
        SignatureMatch::new("matroska", Category::Videos),
    ),
    magic(
        0,
        b"\x30\x26\xb2\x75\x8e\x66\xcf\x11",
        SignatureMatch::new("asf", Category::Videos),
    ),
    magic(0, b"FLV\x01", SignatureMatch::new("flv", Category::Videos)),
];

/// Match a file header against the signature table.
///
/// `header` may be shorter than [`SIGNATURE_LEN`]; signatures that need
/// more bytes than are available simply do not match.
pub fn detect(header: &[u8]) -> Option<SignatureMatch> {
    if let Some(found) = detect_riff(header).or_else(|| detect_iso_bmff(header)) {
        return Some(found);
    }

    if let Some(entry) = FIXED.iter().find(|m| matches_at(header, m.offset, m.bytes)) {
        return Some(entry.found);
    }

    detect_weak(header)
}

fn matches_at(header: &[u8], offset: usize, bytes: &[u8]) -> bool {
    header
        .get(offset..offset + bytes.len())
        .is_some_and(|window| window == bytes)
}

/// RIFF is a container: the form type at offset 8 names the payload.
fn detect_riff(header: &[u8]) -> Option<SignatureMatch> {
    if !matches_at(header, 0, b"RIFF") {
        return None;
    }
    match header.get(8..12)? {
        b"WEBP" => Some(SignatureMatch::new("webp", Category::Images)),
        b"WAVE" => Some(SignatureMatch::new("wav", Category::Audio)),
        b"AVI " => Some(SignatureMatch::new("avi", Category::Videos)),
        _ => None,
    }
}

/// ISO base media files (mp4, mov, m4a, heic) carry a `ftyp` box whose
/// major brand tells audio, still images and video apart.
fn detect_iso_bmff(header: &[u8]) -> Option<SignatureMatch> {
    if !matches_at(header, 4, b"ftyp") {
        return None;
    }
    match header.get(8..12)? {
        b"M4A " | b"M4B " => Some(SignatureMatch::new("m4a", Category::Audio)),
        b"heic" | b"heix" | b"mif1" | b"msf1" | b"avif" => {
            Some(SignatureMatch::new("heif", Category::Images))
        }
        _ => Some(SignatureMatch::new("mp4", Category::Videos)),
    }
}

/// Short signatures that need an extra structural check to avoid
/// matching ordinary text.
fn detect_weak(header: &[u8]) -> Option<SignatureMatch> {
    // BMP: "BM" followed by the reserved (zero) words at 6..10
    if matches_at(header, 0, b"BM") && header.get(6..10) == Some(&[0u8; 4][..]) {
        return Some(SignatureMatch::new("bmp", Category::Images));
    }

    // MPEG audio frame sync without an ID3 tag (layer III) or ADTS (AAC)
    if let [0xff, second, ..] = header {
        return match *second {
            0xfb | 0xf3 | 0xf2 => Some(SignatureMatch::new("mp3", Category::Audio)),
            0xf1 | 0xf9 => Some(SignatureMatch::new("aac", Category::Audio)),
            _ => None,
        };
    }

    None
}
