//! Unit tests for block framing

use tzparse::capture::{CaptureError, FrameReader};

use crate::helpers::frame;

#[test]
fn single_five_byte_block_consumes_whole_capture() {
    let capture = [0x05, 0x00, 1, 2, 3, 4, 5];
    let mut reader = FrameReader::new(&capture);

    let block = reader.next().unwrap().unwrap();
    assert_eq!(block.index, 0);
    assert_eq!(block.length, 5);
    assert_eq!(block.payload, &[1, 2, 3, 4, 5]);
    assert!(reader.next().is_none());
    assert_eq!(reader.consumed(), capture.len());
}

#[test]
fn well_formed_captures_consume_every_byte() {
    for sizes in [vec![], vec![0], vec![1, 2, 3], vec![300, 0, 65535]] {
        let mut capture = Vec::new();
        for size in &sizes {
            capture.extend(frame(&vec![0x5A; *size]));
        }

        let mut reader = FrameReader::new(&capture);
        let blocks: Vec<_> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(blocks.len(), sizes.len());
        assert_eq!(reader.consumed(), capture.len());
        for (block, size) in blocks.iter().zip(&sizes) {
            assert_eq!(block.length as usize, *size);
        }
    }
}

#[test]
fn blocks_record_their_offsets() {
    let mut capture = frame(&[1, 2, 3]);
    capture.extend(frame(&[4]));

    let blocks: Vec<_> = FrameReader::new(&capture)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(blocks[1].offset, 5);
    assert_eq!(blocks[1].payload_offset(), 7);
    assert_eq!(blocks[1].frame_len(), 3);
}

#[test]
fn declared_length_past_end_is_truncated_frame() {
    let capture = [0x08, 0x00, 1, 2, 3];
    let mut reader = FrameReader::new(&capture);

    match reader.next().unwrap().unwrap_err() {
        CaptureError::TruncatedFrame { range, .. } => {
            assert_eq!((range.start, range.end), (0, 10));
        }
        other => panic!("Expected TruncatedFrame, got {other:?}"),
    }
    assert!(reader.next().is_none());
    assert_eq!(reader.consumed(), 0);
}

#[test]
fn lone_length_byte_is_truncated_frame() {
    let mut reader = FrameReader::new(&[0x01]);
    let error = reader.next().unwrap().unwrap_err();
    assert!(error.is_frame_error());
}
