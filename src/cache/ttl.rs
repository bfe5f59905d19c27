use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    hash::Hash,
    time::Duration,
};

use tokio::time::Instant;

/// Множество ключей с истечением по возрасту (не LRU).
///
/// Дедлайны хранятся в `HashMap`, а порядок истечения в min-куче.
/// Устаревшие элементы кучи (после повторной вставки ключа) пропускаются
/// при очистке.
#[derive(Debug)]
pub struct TtlCache<K> {
    deadlines: HashMap<K, Instant>,
    queue: BinaryHeap<Reverse<(Instant, K)>>,
    ttl: Duration,
}

impl<K> TtlCache<K>
where
    K: Hash + Eq + Ord + Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            deadlines: HashMap::new(),
            queue: BinaryHeap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Есть ли живая запись. Истёкшая, но ещё не вычищенная запись считается
    /// отсутствующей.
    pub fn contains(
        &self,
        key: &K,
    ) -> bool {
        self.deadlines
            .get(key)
            .is_some_and(|deadline| *deadline > Instant::now())
    }

    /// Вставляет ключ с дедлайном `now + ttl`.
    pub fn insert(
        &mut self,
        key: K,
    ) {
        let deadline = Instant::now() + self.ttl;
        self.deadlines.insert(key.clone(), deadline);
        self.queue.push(Reverse((deadline, key)));
    }

    /// Атомарная проверка с вставкой: `true`, если ключа не было и он
    /// записан; `false`, если это повтор в пределах TTL.
    pub fn check_and_insert(
        &mut self,
        key: K,
    ) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.insert(key);
        true
    }

    /// Удаляет все истёкшие записи и возвращает их количество.
    pub fn purge(&mut self) -> usize {
        let now = Instant::now();
        let mut expired = 0;

        while let Some(Reverse((deadline, _))) = self.queue.peek() {
            if *deadline > now {
                break;
            }
            let Some(Reverse((deadline, key))) = self.queue.pop() else {
                break;
            };
            // Ключ мог быть вставлен заново с более поздним дедлайном.
            if self.deadlines.get(&key) == Some(&deadline) {
                self.deadlines.remove(&key);
                expired += 1;
            }
        }

        expired
    }

    /// Количество записей, включая истёкшие, но ещё не вычищенные.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
