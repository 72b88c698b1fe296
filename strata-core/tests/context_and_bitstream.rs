use std::io::Cursor;
use strata_core::bitstream::{BitReader, BitWriter};
use strata_core::context::{Context, DataType};
use strata_core::limits::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, bwt_chunk_count};

#[test]
fn bitstream_round_trips_a_byte_stream_through_bit_writes() {
    let payload = b"the quick brown fox jumps over the lazy dog";

    let mut encoded = Vec::new();
    {
        let mut writer = BitWriter::new(&mut encoded);
        for &byte in payload {
            writer.write_bits(byte as u32, 8).unwrap();
        }
        writer.close().unwrap();
    }
    assert_eq!(encoded.len(), payload.len());

    let mut reader = BitReader::new(Cursor::new(&encoded));
    for &byte in payload {
        assert_eq!(reader.read_bits(8).unwrap(), byte as u32);
    }
}

#[test]
fn context_transform_chain_and_data_type_hint_compose() {
    let mut ctx = Context::new();
    ctx.set("transform", "BWT+MTFT+ZRLT")
        .set("entropy", "ANS1")
        .set("blockSize", "2000000")
        .set_data_type(DataType::Utf8);

    assert_eq!(ctx.transform_chain(), vec!["BWT", "MTFT", "ZRLT"]);
    assert_eq!(ctx.entropy(), "ANS1");
    assert_eq!(ctx.block_size(), Some(2_000_000_usize.next_multiple_of(16)));
    assert_eq!(ctx.data_type(), DataType::Utf8);
}

#[test]
fn bwt_chunk_count_stays_within_bounds_across_the_block_range() {
    assert_eq!(bwt_chunk_count(MIN_BLOCK_SIZE), 1);
    let c = bwt_chunk_count(MAX_BLOCK_SIZE);
    assert_eq!(c, 8);
}
