use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CelebrationMessage {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

const fn message(
    title: &'static str,
    description: &'static str,
    icon: &'static str,
) -> CelebrationMessage {
    CelebrationMessage {
        title,
        description,
        icon,
    }
}

/// Sticker counts that earn a dedicated message. `MILESTONE_MESSAGES[i]`
/// belongs to `MILESTONES[i]`.
pub const MILESTONES: [u32; 12] = [1, 3, 5, 10, 20, 30, 40, 50, 60, 70, 80, 100];

pub const MILESTONE_MESSAGES: [CelebrationMessage; 12] = [
    message(
        "첫 번째 스티커!",
        "새로운 여정의 시작이에요!\n첫 걸음을 내딛었네요 🎯",
        "🌟",
    ),
    message(
        "3개 달성!",
        "습관의 씨앗이 싹트고 있어요\n이대로 계속 해보세요! 💪",
        "🌱",
    ),
    message(
        "5개 달성!",
        "꾸준함이 빛을 발하고 있어요\n정말 멋진 성과예요! ✨",
        "⭐",
    ),
    message(
        "10개 달성!",
        "10개의 성취!\n쌓아온 결과가 자랑스러워요 🎉",
        "🎖️",
    ),
    message(
        "20개 달성!",
        "이젠 꽤 익숙해졌죠?\n당신만의 리듬을 잘 찾아가고 있어요 🧭",
        "👑",
    ),
    message(
        "30개 달성!",
        "꾸준함이 빛나고 있어요\n여기까지 온 당신, 정말 대단해요 🌟",
        "🚀",
    ),
    message(
        "40개 달성!",
        "성장의 속도가 붙었어요\n멋진 흐름을 이어가고 있어요 💫",
        "📈",
    ),
    message(
        "50개 달성!",
        "50개의 스티커가 쌓였어요\n이제 당신만의 페이스가 느껴져요 🏅",
        "🥇",
    ),
    message(
        "60개 달성!",
        "꾸준함은 결국 힘이 돼요\n스스로가 자랑스러울 거예요 💖",
        "🔥",
    ),
    message(
        "70개 달성!",
        "매일의 노력이 쌓여 든든한 습관이 되어가고 있어요\n계속 멋지게 나아가요 🏆",
        "🎯",
    ),
    message(
        "80개 달성!",
        "눈앞에 목표가 보이네요\n마지막까지 함께 달려봐요 🌈",
        "🎊",
    ),
    message(
        "100개 달성!",
        "이걸 해낸 당신이라면\n앞으로 무엇이든 해낼 수 있어요 🌟",
        "🏁",
    ),
];

/// Encouragement pool for counts that are neither a milestone nor the goal.
pub const DEFAULT_MESSAGES: [CelebrationMessage; 6] = [
    message(
        "또 하나 완료!",
        "작은 실천이 큰 변화를 만들어요\n오늘도 잘하고 있어요! 👍",
        "✅",
    ),
    message(
        "좋아요!",
        "매일의 작은 성취가\n나를 더 나은 사람으로 만들어요 🌟",
        "😊",
    ),
    message(
        "한 걸음 더!",
        "조금씩 나아가는 지금 이 순간이\n가장 중요해요 🚶‍♂️",
        "👣",
    ),
    message(
        "계속해볼까요?",
        "지금처럼만 해도 충분해요\n중요한건 꾸준함 🐢",
        "🍀",
    ),
    message(
        "잘하고 있어요!",
        "작은 습관이 쌓여\n놀라운 변화를 만들어낼 거예요 🌈",
        "💡",
    ),
    message(
        "멋져요!",
        "자신을 위한 실천\n그게 바로 최고의 투자예요 💖",
        "🌟",
    ),
];

pub const FINAL_MESSAGES: [CelebrationMessage; 5] = [
    message(
        "목표 달성!",
        "목표 달성!\n자신을 향한 최고의 선물이에요 🎁",
        "🚀",
    ),
    message(
        "목표 달성!",
        "작은 노력이 모여\n크고 멋진 결과가 되었어요 ✨",
        "🌟",
    ),
    message(
        "목표 달성!",
        "한 걸음 한 걸음이\n당신을 여기까지 이끌었어요 👣",
        "🎉",
    ),
    message(
        "목표 달성!",
        "자신에게 보내는\n가장 따뜻한 박수예요 👏",
        "💖",
    ),
    message(
        "목표 달성!",
        "목표를 향한 여정,\n끝까지 잘 마쳤어요 🎯",
        "🏁",
    ),
];

/// Position of `count` in [`MILESTONES`], if it is one.
pub fn milestone_index(count: u32) -> Option<usize> {
    MILESTONES.iter().position(|&m| m == count)
}
