//! Per-chat media rotation.
//!
//! Every chat walks its own shuffled permutation of the catalog, so an
//! animation is never repeated within a chat until all others have been sent.

use std::{collections::HashMap, sync::Arc};

use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};
use tokio::sync::Mutex;

use crate::{domain::ChatId, Error, Result};

/// Animations sent when nothing else is configured.
pub const DEFAULT_CATALOG: &[&str] = &[
    "https://media1.tenor.com/m/YRRC1UzgBKwAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%B3%D0%BE%D0%BE%D0%BE%D0%BB.gif",
    "https://media1.tenor.com/m/SQAdjmBacesAAAAd/%D0%BC%D0%B5%D0%B4%D0%B2%D0%B5%D0%B4%D1%8C-%D0%B3%D0%BE%D0%BB-%D0%B3%D0%BE%D0%BE%D0%BE%D0%BE%D0%BB.gif",
    "https://media1.tenor.com/m/tDrxZgpCk9cAAAAd/%D0%B4%D0%B0%D0%B9%D1%82%D0%B5-%D0%B3%D0%BE%D0%BB-%D0%B4%D0%B0%D0%B9%D1%82%D0%B5-%D0%B3%D0%BE%D0%BE%D0%BE%D0%BE%D0%BB.gif",
    "https://media1.tenor.com/m/8oouL_By9bAAAAAd/%D0%B3%D0%BE%D0%BE%D0%BE%D0%BB-svo.gif",
    "https://media1.tenor.com/m/k0vJhl9G4NMAAAAd/%D0%BC%D0%B5%D0%B4%D0%B2%D0%B5%D0%B4%D1%8C-z-%D0%B3%D0%BE%D0%BE%D0%BB.gif",
    "https://media1.tenor.com/m/IXe5Lfcr_hkAAAAd/bear-breakcore.gif",
    "https://media1.tenor.com/m/xHEXH8TLgvsAAAAd/raybear.gif",
    "https://media1.tenor.com/m/0uEA7ieXaKoAAAAC/raybear.gif",
    "https://media1.tenor.com/m/YRRC1UzgBKwAAAAC/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%B3%D0%BE%D0%BE%D0%BE%D0%BB.gif",
    "https://media1.tenor.com/m/w9VXRl2T-dgAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%B1%D0%BE%D0%B9%D1%81%D1%8F-%D0%BC%D1%8B-%D0%B8%D0%B4%D1%8C%D0%BE%D0%BC.gif",
    "https://media1.tenor.com/m/AH8ePKM3Zm4AAAAC/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/KSnlrs7zBqUAAAAC/%D0%B4%D0%B5%D1%80%D0%B6%D0%B8-%D0%B3%D0%BE%D0%B9%D0%B4%D1%83-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/2zEirW9gj9UAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%B1%D1%80%D0%B0%D1%82%D1%8F-%D1%82%D0%BE%D0%BC%D0%B0%D1%81-%D1%88%D0%B5%D0%BB%D0%B1%D0%B8.gif",
    "https://media1.tenor.com/m/WHhUnkbahX4AAAAC/%D1%83%D1%82%D1%80%D0%BE-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/DnHgYCZIqssAAAAd/goyda-%D0%BE%D1%85%D0%BB%D0%BE%D0%B1%D1%8B%D1%81%D1%82%D0%B8%D0%BD.gif",
    "https://media1.tenor.com/m/fRVLL9GQty8AAAAd/goyda-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/O8PSKseHiCgAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D1%81%D0%B1%D0%BE%D1%80-%D0%B3%D0%BE%D0%B9%D0%B4%D1%8B.gif",
    "https://media1.tenor.com/m/KvV5NIIqjiMAAAAd/%D0%BF%D1%80%D0%BE%D0%B4%D0%B0%D0%B5%D0%BC-%D0%B3%D0%BE%D0%B9%D0%B4%D1%83-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/ikGQJ03gJq4AAAAd/%D0%BC%D1%8B%D0%B8%D0%B4%D0%B5%D0%BC-%D0%BA%D0%BE%D1%82%D0%B8%D0%BA.gif",
    "https://media1.tenor.com/m/UC8TDXxucKgAAAAd/goida-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/knoJ3ko955gAAAAd/jarvis-goyda.gif",
    "https://media1.tenor.com/m/ASC_CBFskeEAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%BE%D1%85%D0%BB%D0%BE%D0%B1%D1%8B%D1%81%D1%82%D0%B8%D0%BD.gif",
    "https://media1.tenor.com/m/q4WgsT3v8Y4AAAAd/goida.gif",
    "https://media1.tenor.com/m/mVMwrejhwI4AAAAd/%D1%81%D0%B2%D0%BE-%D1%81%D0%BE%D0%B1%D0%B0%D0%BA%D0%B0.gif",
    "https://media1.tenor.com/m/macn07UJ1w0AAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%BC%D0%B8%D0%BA%D1%83.gif",
    "https://media1.tenor.com/m/Aj6WQ7arxaUAAAAd/yakuza-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/956gGP7xus8AAAAd/%D0%BF%D0%BE%D1%85%D1%83%D0%B9-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/DNpJ0wbNwk8AAAAd/%D0%BA%D0%B8%D0%B5%D0%B2-%D0%BA%D1%80%D0%B5%D0%BC%D0%BB%D0%B5%D0%B1%D0%BE%D1%82.gif",
    "https://media1.tenor.com/m/zSC3TxBBuC0AAAAd/dog-goal.gif",
    "https://media1.tenor.com/m/RxQOZx_ejxgAAAAd/goooal-goal.gif",
    "https://media1.tenor.com/m/o5l-YLWBDk4AAAAd/snow-team-snow-squad.gif",
    "https://media1.tenor.com/m/r-gzzf2x364AAAAd/touchdown-td.gif",
    "https://media1.tenor.com/m/FuLoJ2M0qjMAAAAd/red-panda-red-pandas.gif",
    "https://media1.tenor.com/m/4CVwlr3LYuAAAAAd/greys-anatomy-grizzly-bear.gif",
    "https://media.tenor.com/pfJe2-vfoPcAAAAj/bear.gif",
    "https://media1.tenor.com/m/6P80PyIyXscAAAAC/blackbeardiner-wink.gif",
    "https://media.tenor.com/EiIgGelxfO0AAAAj/ositos-blancos-osito.gif",
    "https://media1.tenor.com/m/E-T2ZtsOzHgAAAAd/party.gif",
    "https://media1.tenor.com/m/fvILudVo5h4AAAAd/bear-dance.gif",
    "https://media1.tenor.com/m/ak8NMaf6GkkAAAAd/dance-polarbear.gif",
    "https://media.tenor.com/gbBdJjDdkU4AAAAj/petpet-%27pet-pet.gif",
    "https://media.tenor.com/C8-c3HUWARkAAAAj/polar-bear-police-bear.gif",
    "https://media1.tenor.com/m/ND_8Z8BDk-wAAAAd/%D0%BE%D0%B1%D1%8A%D1%8F%D0%B2%D0%BB%D0%B5%D0%BD%D0%B0-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/F2RKuT1DU5YAAAAd/z-goida.gif",
    "https://media1.tenor.com/m/wnKuWB3bzcsAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-%D1%82%D1%80%D0%B0%D0%BC%D0%BF.gif",
    "https://media1.tenor.com/m/m2Ajo6mQlgkAAAAd/%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0-pootis-engage.gif",
    "https://media1.tenor.com/m/kwSeNk40bF0AAAAd/outis-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
    "https://media1.tenor.com/m/5ZZ9BaEzU7UAAAAd/%D0%B4%D0%B0%D0%B9%D1%82%D0%B5-%D0%B3%D0%BE%D0%B9%D0%B4%D1%83-%D0%B3%D0%BE%D0%B9%D0%B4%D0%B0.gif",
];

/// Fixed, non-empty, ordered list of media URLs shared by all chats.
#[derive(Clone, Debug)]
pub struct MediaCatalog {
    urls: Arc<[String]>,
}

impl MediaCatalog {
    pub fn new<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(Into::into)
            .filter(|u| !u.trim().is_empty())
            .collect();
        if urls.is_empty() {
            return Err(Error::Config("media catalog is empty".to_string()));
        }
        Ok(Self { urls: urls.into() })
    }

    pub fn builtin() -> Self {
        Self {
            urls: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

/// Traversal state of one chat over the catalog.
#[derive(Debug)]
struct ChatCursor {
    permutation: Vec<usize>,
    position: usize,
}

impl ChatCursor {
    fn shuffled(len: usize, rng: &mut dyn RngCore) -> Self {
        let mut permutation: Vec<usize> = (0..len).collect();
        // Fisher-Yates.
        permutation.shuffle(rng);
        Self {
            permutation,
            position: 0,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.permutation.len()
    }
}

struct SelectorState {
    cursors: HashMap<ChatId, ChatCursor>,
    rng: Box<dyn RngCore + Send>,
}

/// Hands out catalog entries per chat without repeats inside a cycle.
///
/// Cursors are created lazily and kept for the lifetime of the selector.
pub struct MediaSelector {
    catalog: MediaCatalog,
    state: Mutex<SelectorState>,
}

impl MediaSelector {
    pub fn new(catalog: MediaCatalog) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    /// Use a caller-provided random source (seeded in tests).
    pub fn with_rng(catalog: MediaCatalog, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            catalog,
            state: Mutex::new(SelectorState {
                cursors: HashMap::new(),
                rng: Box::new(rng),
            }),
        }
    }

    pub fn catalog(&self) -> &MediaCatalog {
        &self.catalog
    }

    /// Next media URL for `chat_id`, reshuffling when the chat's cycle is used up.
    pub async fn next_media(&self, chat_id: ChatId) -> String {
        let mut guard = self.state.lock().await;
        let SelectorState { cursors, rng } = &mut *guard;

        let len = self.catalog.len();
        let cursor = cursors
            .entry(chat_id)
            .or_insert_with(|| ChatCursor::shuffled(len, &mut **rng));
        if cursor.is_exhausted() {
            *cursor = ChatCursor::shuffled(len, &mut **rng);
        }

        let idx = cursor.permutation[cursor.position];
        cursor.position += 1;

        self.catalog.urls[idx].clone()
    }

    /// Number of chats with a cursor.
    pub async fn tracked_chats(&self) -> usize {
        self.state.lock().await.cursors.len()
    }
}

impl std::fmt::Debug for MediaSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSelector")
            .field("catalog_len", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn catalog(n: usize) -> MediaCatalog {
        MediaCatalog::new((0..n).map(|i| format!("https://media.test/{i}.gif"))).unwrap()
    }

    fn seeded(n: usize, seed: u64) -> MediaSelector {
        MediaSelector::with_rng(catalog(n), StdRng::seed_from_u64(seed))
    }

    async fn take(sel: &MediaSelector, chat: i64, n: usize) -> Vec<String> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(sel.next_media(ChatId(chat)).await);
        }
        out
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = MediaCatalog::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(MediaCatalog::new(["  "]).is_err());
    }

    #[test]
    fn builtin_catalog_is_populated() {
        let c = MediaCatalog::builtin();
        assert_eq!(c.len(), DEFAULT_CATALOG.len());
        assert!(c.urls().iter().all(|u| u.starts_with("https://")));
    }

    #[tokio::test]
    async fn one_cycle_is_a_permutation_of_the_catalog() {
        let sel = seeded(10, 7);
        let got = take(&sel, 1, 10).await;
        let unique: HashSet<_> = got.iter().cloned().collect();
        let expected: HashSet<_> = sel.catalog().urls().iter().cloned().collect();
        assert_eq!(got.len(), unique.len());
        assert_eq!(unique, expected);
    }

    #[tokio::test]
    async fn every_cycle_covers_the_catalog_again() {
        let sel = seeded(6, 42);
        let got = take(&sel, 1, 18).await;
        let expected: HashSet<_> = sel.catalog().urls().iter().cloned().collect();
        for cycle in got.chunks(6) {
            let set: HashSet<_> = cycle.iter().cloned().collect();
            assert_eq!(set, expected);
        }
    }

    #[tokio::test]
    async fn chats_do_not_interfere() {
        let sel = seeded(5, 3);
        let mut a = Vec::new();
        let mut b = Vec::new();
        for _ in 0..5 {
            a.push(sel.next_media(ChatId(1)).await);
            b.push(sel.next_media(ChatId(2)).await);
        }
        for seq in [&a, &b] {
            let set: HashSet<_> = seq.iter().collect();
            assert_eq!(set.len(), 5);
        }
        assert_eq!(sel.tracked_chats().await, 2);
    }

    #[tokio::test]
    async fn single_item_catalog_always_returns_it() {
        let sel = seeded(1, 0);
        let got = take(&sel, 9, 3).await;
        assert!(got.iter().all(|u| u == "https://media.test/0.gif"));
    }

    #[tokio::test]
    async fn same_seed_gives_same_order() {
        let a = take(&seeded(8, 11), 1, 8).await;
        let b = take(&seeded(8, 11), 1, 8).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn concurrent_callers_never_repeat_within_a_cycle() {
        let sel = Arc::new(seeded(16, 5));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let sel = sel.clone();
            tasks.spawn(async move { sel.next_media(ChatId(77)).await });
        }
        let mut seen = HashSet::new();
        while let Some(url) = tasks.join_next().await {
            assert!(seen.insert(url.unwrap()));
        }
        assert_eq!(seen.len(), 16);
    }
}
