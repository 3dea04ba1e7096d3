#![no_main]
use ciberchat_stream::{AssemblerConfig, ConversationState, Frame, FrameDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Split the input at its first byte to exercise read boundaries.
    let split = data.first().map_or(0, |&b| usize::from(b)).min(data.len());
    let (head, tail) = data.split_at(split);

    let mut decoder = FrameDecoder::new(&AssemblerConfig::default());
    let mut state = ConversationState::new();
    let frames = decoder
        .feed(head)
        .into_iter()
        .chain(decoder.feed(tail))
        .chain(decoder.finish());
    for frame in frames {
        if let Frame::Event(event) = frame {
            state.apply(event);
        }
    }
    assert!(state.messages().iter().filter(|m| m.streaming).count() <= 1);
});
