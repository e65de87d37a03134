use super::*;

fn rgb(width: u32, height: u32, v: u8) -> Frame {
    Frame::filled(width, height, &[v, v, v]).unwrap()
}

#[test]
fn frame_rejects_wrong_data_length() {
    let shape = FrameShape::new(2, 2, 3).unwrap();
    assert!(Frame::new(shape, vec![0; 12]).is_ok());
    assert!(matches!(
        Frame::new(shape, vec![0; 11]),
        Err(LightrailError::Format(_))
    ));
}

#[test]
fn blank_detection() {
    assert!(rgb(2, 2, 0).is_blank());
    let mut data = vec![0u8; 12];
    data[7] = 1;
    let frame = Frame::new(FrameShape::new(2, 2, 3).unwrap(), data).unwrap();
    assert!(!frame.is_blank());
}

#[test]
fn sequence_is_contiguous_and_ordered() {
    let seq = FrameSequence::from_frames([rgb(2, 1, 1), rgb(2, 1, 2), rgb(2, 1, 3)]).unwrap();
    assert_eq!(seq.len(), 3);
    assert!(!seq.is_empty());
    assert_eq!(seq.as_bytes().len(), 3 * 6);
    assert_eq!(seq.get(1).unwrap().data(), &[2u8; 6]);
    assert_eq!(seq.first().data(), &[1u8; 6]);
    assert!(seq.get(3).is_none());

    let firsts: Vec<u8> = seq.iter().map(|f| f.data()[0]).collect();
    assert_eq!(firsts, vec![1, 2, 3]);
    let reversed: Vec<u8> = seq.iter().rev().map(|f| f.data()[0]).collect();
    assert_eq!(reversed, vec![3, 2, 1]);
}

#[test]
fn sequence_push_rejects_shape_mismatch_without_mutation() {
    let mut seq = FrameSequence::new(rgb(2, 2, 9));
    let before = seq.as_bytes().to_vec();

    let err = seq.push(rgb(3, 2, 1)).unwrap_err();
    assert!(matches!(err, LightrailError::Format(_)));

    let rgba = Frame::filled(2, 2, &[1, 1, 1, 255]).unwrap();
    assert!(seq.push(rgba).is_err());

    assert_eq!(seq.len(), 1);
    assert_eq!(seq.as_bytes(), before.as_slice());
}

#[test]
fn empty_sequence_is_rejected() {
    assert!(matches!(
        FrameSequence::from_frames(Vec::new()),
        Err(LightrailError::Format(_))
    ));
}

#[test]
fn view_round_trips_to_owned_frame() {
    let frame = Frame::filled(1, 2, &[4, 5, 6, 7]).unwrap();
    let seq = FrameSequence::new(frame.clone());
    assert_eq!(seq.first().to_frame(), frame);
}

#[test]
fn huge_expected_length_reserves_a_bounded_amount() {
    let frame = Frame::filled(640, 480, &[1, 2, 3]).unwrap();
    let mut seq = FrameSequence::with_capacity(frame.clone(), usize::MAX).unwrap();
    assert!(seq.data.capacity() <= MAX_UPFRONT_RESERVE + frame.shape().byte_len());

    seq.push(frame).unwrap();
    assert_eq!(seq.len(), 2);
}
