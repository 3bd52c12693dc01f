
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Opens a file for buffered reading, transparently decompressing anything ending in ".gz"
/// # Arguments
/// * `filename` - the file path to open
/// # Errors
/// * if the file does not open properly
pub fn open_buffered(filename: &Path) -> Result<Box<dyn BufRead>, Box<dyn std::error::Error>> {
    let fp: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::read::MultiGzDecoder::new(
                File::open(filename)?
            )
        )
    } else {
        Box::new(File::open(filename)?)
    };
    Ok(Box::new(BufReader::new(fp)))
}

/// Helper function that loads a file into some type, helpful generic
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let fp = open_buffered(filename)?;
    let result: T = serde_json::from_reader(fp)?;
    Ok(result)
}

/// This will save a generic serializable struct to JSON.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file: Box<dyn std::io::Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::write::GzEncoder::new(
                File::create(out_filename)?,
                flate2::Compression::best()
            )
        )
    } else {
        Box::new(File::create(out_filename)?)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

/// Writes a collection of serializable rows to a tab-delimited file with a header.
/// # Arguments
/// * `rows` - the rows to write, in order
/// * `filename` - the output path
/// # Errors
/// * if we have any errors opening or writing to the file
pub fn save_tsv<T: serde::Serialize>(rows: &[T], filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(filename)?;
    for row in rows.iter() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::io::Read;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct TestRow {
        position: usize,
        label: String
    }

    #[test]
    fn test_json_gz_roundtrip() {
        let out_dir = tempfile::tempdir().unwrap();
        let mut data: BTreeMap<String, usize> = BTreeMap::new();
        data.insert("KIR2DL1".to_string(), 3);

        for filename in ["plain.json", "compressed.json.gz"] {
            let path = out_dir.path().join(filename);
            save_json(&data, &path).unwrap();
            let loaded: BTreeMap<String, usize> = load_json(&path).unwrap();
            assert_eq!(loaded, data);
        }
    }

    #[test]
    fn test_save_tsv() {
        let out_dir = tempfile::tempdir().unwrap();
        let path = out_dir.path().join("rows.tsv");
        let rows = vec![
            TestRow { position: 3, label: "A".to_string() },
            TestRow { position: 4, label: "C,G".to_string() }
        ];
        save_tsv(&rows, &path).unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "position\tlabel\n3\tA\n4\tC,G\n");
    }
}
