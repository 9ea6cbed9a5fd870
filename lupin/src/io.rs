use flate2::read::GzDecoder;
use ndarray::prelude::*;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

///
/// Open a file for reading, and return a buffered reader
/// * `input_file` - file name--either gzipped or not
///
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {}", input_file, e))?;
    match ext {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
/// * `output_file` - file name--either gzipped or not
///
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }

    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    let file = File::create(output_file)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {}", output_file, e))?;
    match ext {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

///
/// Create the parent directory of `file` if needed
///
pub fn mkdir(file: &str) -> anyhow::Result<()> {
    let path = Path::new(file);
    let dir = path.parent().ok_or(anyhow::anyhow!("no parent"))?;
    std::fs::create_dir_all(dir)?;
    Ok(())
}

///
/// Write one line per item
///
/// * `lines` - anything displayable
/// * `output_file` - file name--either gzipped or not
///
pub fn write_types<T>(lines: &[T], output_file: &str) -> anyhow::Result<()>
where
    T: Display,
{
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        if let Err(e) = writeln!(buf, "{}", line) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(());
            }
            return Err(anyhow::anyhow!("failed to write {}: {}", output_file, e));
        }
    }
    buf.flush()?;
    Ok(())
}

fn is_not_comment_line(line: &str) -> bool {
    !(line.starts_with('#') || line.starts_with('%'))
}

///
/// Read a dense real matrix, one row per line, whitespace separated.
/// Blank lines and lines starting with `#` or `%` are skipped.
///
pub fn read_matrix(input_file: &str) -> anyhow::Result<Array2<f64>> {
    let buf = open_buf_reader(input_file)?;

    let mut ncols = None;
    let mut data = vec![];
    let mut nrows = 0;

    for (line_no, line) in buf.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || !is_not_comment_line(line) {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|x| x.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| anyhow::anyhow!("{}:{}: {}", input_file, line_no + 1, e))?;

        match ncols {
            None => ncols = Some(row.len()),
            Some(d) if d != row.len() => {
                anyhow::bail!(
                    "{}:{}: expected {} columns, found {}",
                    input_file,
                    line_no + 1,
                    d,
                    row.len()
                );
            }
            _ => {}
        }

        data.extend(row);
        nrows += 1;
    }

    let ncols = ncols.ok_or(anyhow::anyhow!("no data in {}", input_file))?;
    Ok(Array2::from_shape_vec((nrows, ncols), data)?)
}

///
/// Write a matrix as tab-separated rows
///
pub fn write_matrix<T: Display>(mat: &Array2<T>, output_file: &str) -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = mat
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|x| format!("{}", x))
                .collect::<Vec<String>>()
                .join("\t")
                .into_boxed_str()
        })
        .collect();
    write_types(&lines, output_file)
}
