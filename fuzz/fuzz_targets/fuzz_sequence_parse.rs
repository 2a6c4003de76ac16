#![no_main]

use libfuzzer_sys::fuzz_target;
use mungelab_core::registry::TransformRegistry;
use mungelab_core::sequence::{Sequence, SerializeOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary text must never panic the parser, only return an error.
    let Ok(sequence) = Sequence::parse(text, 1) else {
        return;
    };

    // A sequence that parsed successfully must re-serialize to text that
    // parses back to the same sequence.
    let registry = TransformRegistry::bootstrap();
    let rendered = sequence.serialize(SerializeOptions::full(), &registry);
    let reparsed = Sequence::parse(&rendered, 1).expect("a sequence's own full serialization must re-parse");
    assert_eq!(sequence, reparsed, "serialize/parse round trip diverged");
});
