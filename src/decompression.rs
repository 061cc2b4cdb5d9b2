use anyhow::{anyhow, Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Read buffer for mapping files, which are typically large
const READ_BUFFER_SIZE: usize = 1 << 20;

/// Compression detected from a file's leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// 1F 8B 08
    Gzip,
    /// 28 B5 2F FD
    Zstd,
    Plain,
}

pub fn detect_compression(head: &[u8]) -> Compression {
    if head.len() >= 3 && head[..3] == [0x1F, 0x8B, 0x08] {
        Compression::Gzip
    } else if head.len() >= 4 && head[..4] == [0x28, 0xB5, 0x2F, 0xFD] {
        Compression::Zstd
    } else {
        Compression::Plain
    }
}

/// Sniff the first bytes of `reader` and wrap it in the matching decoder
pub fn maybe_decompress<R: Read + Send + 'static>(
    mut reader: R,
) -> io::Result<(Compression, Box<dyn BufRead + Send>)> {
    let mut head = [0u8; 4];
    let mut n = 0;
    // Short reads are legal; keep going until 4 bytes or EOF
    while n < head.len() {
        match reader.read(&mut head[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    let compression = detect_compression(&head[..n]);
    let chained = Cursor::new(head[..n].to_vec()).chain(reader);

    let wrapped: Box<dyn BufRead + Send> = match compression {
        Compression::Gzip => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiGzDecoder::new(chained),
        )),
        Compression::Zstd => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            zstd::Decoder::new(chained)?,
        )),
        Compression::Plain => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, chained)),
    };
    Ok((compression, wrapped))
}

/// Open a way-to-nodes mapping file, decompressing gzip or zstd transparently
pub fn open_mapping_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();

    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        return Err(anyhow!(
            "ZIP archives are not supported for '{}'. Only gzip and zstd are decompressed on the fly; extract it first: unzip {}",
            path.display(),
            path.display()
        ));
    }

    let file = File::open(path)
        .with_context(|| format!("Cannot open mapping file '{}'", path.display()))?;
    let (compression, reader) = maybe_decompress(file)
        .with_context(|| format!("Failed to detect compression of '{}'", path.display()))?;
    log::debug!("opened mapping file {} ({:?})", path.display(), compression);
    Ok(reader)
}
