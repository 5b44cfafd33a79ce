// Altitude milestones, ascending by threshold.

/// A fixed progress goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Milestone {
    pub threshold: u64,
    pub name: &'static str,
    pub reward: &'static str,
}

const fn m(threshold: u64, name: &'static str, reward: &'static str) -> Milestone {
    Milestone {
        threshold,
        name,
        reward,
    }
}

pub static MILESTONES: [Milestone; 9] = [
    m(1_000, "구름층 돌파", "☁️ 첫 번째 도전 완료!"),
    m(5_000, "중간권 진입", "🌤️ 높은 곳에 도달했네요!"),
    m(10_000, "성층권 돌파", "✈️ 비행기와 같은 고도!"),
    m(20_000, "오존층 접근", "🛡️ 지구의 보호막 근처!"),
    m(50_000, "중간권 진입", "🌌 거의 우주예요!"),
    m(100_000, "우주 경계선", "🚀 카르만 라인 돌파!"),
    m(200_000, "저궤도", "🛰️ 인공위성 영역!"),
    m(400_000, "국제우주정거장", "🏠 우주에서 살 수 있어요!"),
    m(1_000_000, "달 궤도", "🌙 달까지 갈 수 있어요!"),
];

/// First milestone above `altitude`, or the last one once everything is passed.
pub fn current_goal(altitude: u64) -> &'static Milestone {
    MILESTONES
        .iter()
        .find(|m| m.threshold > altitude)
        .unwrap_or(&MILESTONES[MILESTONES.len() - 1])
}

/// Threshold of the last milestone at or below `altitude`; 0 before the first.
pub fn previous_threshold(altitude: u64) -> u64 {
    MILESTONES
        .iter()
        .rev()
        .find(|m| m.threshold <= altitude)
        .map_or(0, |m| m.threshold)
}

/// Milestones whose threshold lies in `(before, after]`, ascending.
pub fn crossed_between(before: u64, after: u64) -> impl Iterator<Item = &'static Milestone> {
    MILESTONES
        .iter()
        .filter(move |m| m.threshold > before && m.threshold <= after)
}
