//! WAV concatenation for chunked synthesis

use std::io::Cursor;

use crate::PipelineError;

/// Merge WAV payloads into one, under the first payload's header.
///
/// Every chunk must share the first chunk's channel count, sample rate and
/// sample format.
pub fn concat_wav(chunks: &[Vec<u8>]) -> Result<Vec<u8>, PipelineError> {
    match chunks {
        [] => Err(PipelineError::Audio("no audio to combine".to_string())),
        [single] => Ok(single.clone()),
        [first, ..] => {
            let spec = hound::WavReader::new(Cursor::new(first.as_slice()))?.spec();

            let mut cursor = Cursor::new(Vec::new());
            {
                let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
                for (index, chunk) in chunks.iter().enumerate() {
                    let mut reader = hound::WavReader::new(Cursor::new(chunk.as_slice()))?;
                    if reader.spec() != spec {
                        return Err(PipelineError::Audio(format!(
                            "chunk {} format {:?} differs from {:?}",
                            index,
                            reader.spec(),
                            spec
                        )));
                    }

                    match spec.sample_format {
                        hound::SampleFormat::Float => {
                            for sample in reader.samples::<f32>() {
                                writer.write_sample(sample?)?;
                            }
                        }
                        hound::SampleFormat::Int => {
                            for sample in reader.samples::<i32>() {
                                writer.write_sample(sample?)?;
                            }
                        }
                    }
                }
                writer.finalize()?;
            }
            Ok(cursor.into_inner())
        }
    }
}
