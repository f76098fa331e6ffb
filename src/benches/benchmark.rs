#[macro_use]
extern crate criterion;
extern crate enigma2_epg;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use criterion::Criterion;
use enigma2_epg::{
    EPG_HEADER, EPG_LONG_DESC, EPG_MAGIC, EPG_SHORT_DESC, EpgParser, RenderSettings,
    render_to_vec,
};

const CHANNELS: u32 = 50;
const EVENTS_PER_CHANNEL: u32 = 200;

/// Every event references one title and a two-part description, shared per channel.
fn synthetic_dump() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(EPG_MAGIC).unwrap();
    buf.extend_from_slice(EPG_HEADER);
    buf.write_i32::<LittleEndian>(CHANNELS as i32).unwrap();

    for channel in 0..CHANNELS {
        for v in [channel as i32 + 1, 1, 0x3f2, EVENTS_PER_CHANNEL as i32] {
            buf.write_i32::<LittleEndian>(v).unwrap();
        }

        for event in 0..EVENTS_PER_CHANNEL {
            buf.extend_from_slice(&[0x00, 22]);
            buf.write_u16::<BigEndian>(event as u16).unwrap();
            buf.write_u16::<BigEndian>(58884 + (event / 24) as u16).unwrap();
            buf.extend_from_slice(&[(((event % 24) / 10) << 4 | (event % 10)) as u8, 0, 0]);
            buf.extend_from_slice(&[0x00, 0x45, 0x00]);
            for r in 0..3 {
                buf.write_u32::<LittleEndian>(channel * 3 + r).unwrap();
            }
        }
    }

    buf.write_i32::<LittleEndian>((CHANNELS * 3) as i32).unwrap();
    for channel in 0..CHANNELS {
        let parts: [(u8, &[u8]); 3] = [
            (EPG_SHORT_DESC, b"deu\x0a\x00Nachrichten"),
            (EPG_LONG_DESC, b"\x01deu\x00\x00\x00Die wichtigsten Meldungen"),
            (EPG_LONG_DESC, b"\x11deu\x00\x00 des Tages mit Wetter."),
        ];
        for (r, (tag, body)) in parts.iter().enumerate() {
            buf.write_u32::<LittleEndian>(channel * 3 + r as u32).unwrap();
            buf.write_i32::<LittleEndian>(EVENTS_PER_CHANNEL as i32).unwrap();
            buf.push(*tag);
            buf.push(body.len() as u8);
            buf.extend_from_slice(body);
        }
    }

    buf
}

fn criterion_benchmark(c: &mut Criterion) {
    let dump = synthetic_dump();

    c.bench_function("decode and resolve 10k events", |b| {
        b.iter(|| EpgParser::from_buffer(dump.clone()).parse().unwrap())
    });

    let guide = EpgParser::from_buffer(dump.clone()).parse().unwrap();
    let settings = RenderSettings::new();
    c.bench_function("render 10k events", |b| {
        b.iter(|| render_to_vec(&guide, &settings).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
