//! Bundled radio stations, served when the directory is unreachable.

use crate::domain::{Origin, PlayableSource, TrackRecord};

struct FallbackStation {
    uuid: &'static str,
    name: &'static str,
    url: &'static str,
    favicon: &'static str,
    language: &'static str,
}

const IN_ICON: &str = "https://mytuner.global.ssl.fastly.net/media/tvos_radios/ufce9hgzaqzz.png";
const EN_ICON: &str = "https://mytuner.global.ssl.fastly.net/media/tvos_radios/Hcfsgm3Suy.png";

const FALLBACK: [(&str, &[FallbackStation]); 11] = [
    (
        "Bollywood Hits",
        &[
            FallbackStation {
                uuid: "fallback-bollywood-1",
                name: "Bollywood Masala",
                url: "https://stream.zeno.fm/fgrm4qzmzk8uv",
                favicon: "https://mytuner.global.ssl.fastly.net/media/tvos_radios/m8afyszryaqt.png",
                language: "Hindi",
            },
            FallbackStation {
                uuid: "fallback-bollywood-2",
                name: "Bollywood Evergreen",
                url: "https://stream.zeno.fm/60ef4p33vxquv",
                favicon: "https://mytuner.global.ssl.fastly.net/media/tvos_radios/uvclzr9bqbfz.jpg",
                language: "Hindi",
            },
            FallbackStation {
                uuid: "fallback-bollywood-3",
                name: "Bollywood Remix",
                url: "https://stream.zeno.fm/0r0xa792kwzuv",
                favicon: "https://mytuner.global.ssl.fastly.net/media/tvos_radios/m8afyszryaqt.png",
                language: "Hindi",
            },
        ],
    ),
    (
        "Punjabi Radio",
        &[
            FallbackStation {
                uuid: "fallback-punjabi-1",
                name: "Punjabi Beats",
                url: "https://stream.zeno.fm/eyxg23ky4x8uv",
                favicon: "https://mytuner.global.ssl.fastly.net/media/tvos_radios/2bazwnwrpdnc.jpg",
                language: "Punjabi",
            },
            FallbackStation {
                uuid: "fallback-punjabi-2",
                name: "Punjabi Tadka",
                url: "https://stream.zeno.fm/whz78qm9bm8uv",
                favicon: "https://mytuner.global.ssl.fastly.net/media/tvos_radios/2bazwnwrpdnc.jpg",
                language: "Punjabi",
            },
        ],
    ),
    (
        "Tamil Radio",
        &[
            FallbackStation {
                uuid: "fallback-tamil-1",
                name: "Tamil Beats",
                url: "https://stream.zeno.fm/a2fmzk2wzv8uv",
                favicon: IN_ICON,
                language: "Tamil",
            },
            FallbackStation {
                uuid: "fallback-tamil-2",
                name: "Tamil Classics",
                url: "https://stream.zeno.fm/60ef4p33vxquv",
                favicon: IN_ICON,
                language: "Tamil",
            },
        ],
    ),
    (
        "Telugu Radio",
        &[FallbackStation {
            uuid: "fallback-telugu-1",
            name: "Telugu Hits",
            url: "https://stream.zeno.fm/eyxg23ky4x8uv",
            favicon: IN_ICON,
            language: "Telugu",
        }],
    ),
    (
        "Malayalam Radio",
        &[FallbackStation {
            uuid: "fallback-malayalam-1",
            name: "Malayalam Hits",
            url: "https://stream.zeno.fm/whz78qm9bm8uv",
            favicon: IN_ICON,
            language: "Malayalam",
        }],
    ),
    (
        "Classical Indian",
        &[FallbackStation {
            uuid: "fallback-classical-1",
            name: "Carnatic Radio",
            url: "https://stream.zeno.fm/a2fmzk2wzv8uv",
            favicon: IN_ICON,
            language: "Various",
        }],
    ),
    (
        "Top 40 Hits",
        &[
            FallbackStation {
                uuid: "fallback-top40-1",
                name: "Top 40 Radio",
                url: "https://stream.zeno.fm/0r0xa792kwzuv",
                favicon: EN_ICON,
                language: "English",
            },
            FallbackStation {
                uuid: "fallback-top40-2",
                name: "Hit Music Station",
                url: "https://stream.zeno.fm/rqtf0uy2kwzuv",
                favicon: EN_ICON,
                language: "English",
            },
        ],
    ),
    (
        "Hip Hop & R&B",
        &[
            FallbackStation {
                uuid: "fallback-hiphop-1",
                name: "Hip Hop Classics",
                url: "https://stream.zeno.fm/kkrgpbz9bm8uv",
                favicon: EN_ICON,
                language: "English",
            },
            FallbackStation {
                uuid: "fallback-hiphop-2",
                name: "R&B Jams",
                url: "https://stream.zeno.fm/whz78qm9bm8uv",
                favicon: EN_ICON,
                language: "English",
            },
        ],
    ),
    (
        "Rock Radio",
        &[
            FallbackStation {
                uuid: "fallback-rock-1",
                name: "Classic Rock",
                url: "https://stream.zeno.fm/usefm93vwtzuv",
                favicon: EN_ICON,
                language: "English",
            },
            FallbackStation {
                uuid: "fallback-rock-2",
                name: "Rock Anthems",
                url: "https://stream.zeno.fm/n8pz4k0cm0hvv",
                favicon: EN_ICON,
                language: "English",
            },
        ],
    ),
    (
        "Electronic/Dance",
        &[
            FallbackStation {
                uuid: "fallback-electronic-1",
                name: "EDM Hits",
                url: "https://stream.zeno.fm/0r0xa792kwzuv",
                favicon: EN_ICON,
                language: "English",
            },
            FallbackStation {
                uuid: "fallback-electronic-2",
                name: "House & Techno",
                url: "https://stream.zeno.fm/n8pz4k0cm0hvv",
                favicon: EN_ICON,
                language: "English",
            },
        ],
    ),
    (
        "Jazz & Blues",
        &[
            FallbackStation {
                uuid: "fallback-jazz-1",
                name: "Jazz Classics",
                url: "https://stream.zeno.fm/usefm93vwtzuv",
                favicon: EN_ICON,
                language: "English",
            },
            FallbackStation {
                uuid: "fallback-blues-1",
                name: "Blues Channel",
                url: "https://stream.zeno.fm/whz78qm9bm8uv",
                favicon: EN_ICON,
                language: "English",
            },
        ],
    ),
];

pub(crate) fn fallback_for(category: &str) -> Vec<TrackRecord> {
    FALLBACK
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, stations)| stations.iter().map(to_record).collect())
        .unwrap_or_default()
}

fn to_record(station: &FallbackStation) -> TrackRecord {
    TrackRecord {
        id: station.uuid.to_string(),
        title: station.name.to_string(),
        artist: station.language.to_string(),
        thumbnail: Some(station.favicon.to_string()),
        source: Some(PlayableSource::LiveStream(station.url.to_string())),
        origin: Origin::Radio,
    }
}
