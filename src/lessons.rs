//! Built-in lesson catalog.
//!
//! A minimal set of lessons that keeps the app useful without external
//! config or OpenAI. Extra lessons can be contributed via TOML config; the
//! catalog is read-only after startup.

use crate::domain::{Difficulty, Lesson, Phrase};

fn phrase(
  id: u32,
  english: &str,
  vietnamese: &str,
  phonetic: &str,
  difficulty: Difficulty,
  common_mistakes: &[&str],
) -> Phrase {
  Phrase {
    id,
    english: english.into(),
    vietnamese: vietnamese.into(),
    phonetic: phonetic.into(),
    difficulty,
    common_mistakes: common_mistakes.iter().map(|s| s.to_string()).collect(),
  }
}

/// The built-in lessons, in daily rotation order.
pub fn builtin_lessons() -> Vec<Lesson> {
  use Difficulty::{Easy, Medium};

  vec![
    Lesson {
      lesson_id: "day_1_greetings".into(),
      level: "A2".into(),
      topic: "Greetings & Introductions".into(),
      intro_vi: "Chào mừng đến với ChattyVN! Hôm nay chúng ta sẽ học cách chào hỏi và giới thiệu bản thân một cách tự nhiên. Đây là những câu bạn sẽ dùng hàng ngày!".into(),
      target_phrases: vec![
        phrase(1, "Hello, nice to meet you!", "Xin chào, rất vui được gặp bạn!", "/həˈloʊ naɪs tu mit yu/", Easy,
          &["Phát âm 'nice' thành /naɪt/", "Quên âm cuối 'you'"]),
        phrase(2, "My name is John.", "Tên tôi là John.", "/maɪ neɪm ɪz dʒɑn/", Easy,
          &["Nhấn sai trọng âm trong 'name'"]),
        phrase(3, "Where are you from?", "Bạn đến từ đâu?", "/wɛr ɑr yu frʌm/", Medium,
          &["Phát âm 'where' thành 'were'", "Quên âm /r/ cuối 'are'"]),
        phrase(4, "I'm from Vietnam.", "Tôi đến từ Việt Nam.", "/aɪm frʌm viˈɛtnɑm/", Easy,
          &["Nhấn trọng âm sai ở 'Vietnam'"]),
        phrase(5, "Have a great day!", "Chúc bạn một ngày tuyệt vời!", "/hæv ə greɪt deɪ/", Medium,
          &["Phát âm 'have' thành /həv/", "Nối âm giữa các từ"]),
      ],
      cultural_context: Some("Trong văn hóa phương Tây, việc chào hỏi thường ngắn gọn hơn Việt Nam. Không cần hỏi 'ăn cơm chưa?' mà chỉ cần 'How are you?' là đủ.".into()),
      vietnamese_challenges: vec![
        "Âm /θ/ trong 'thank' - đặt lưỡi giữa răng".into(),
        "Âm cuối trong tiếng Anh phải phát âm rõ".into(),
        "Trọng âm từ khác với tiếng Việt".into(),
      ],
    },

    Lesson {
      lesson_id: "day_2_daily_activities".into(),
      level: "A2".into(),
      topic: "Daily Activities".into(),
      intro_vi: "Hôm nay chúng ta học cách nói về các hoạt động hàng ngày. Đây là những câu bạn sẽ dùng để kể về cuộc sống của mình!".into(),
      target_phrases: vec![
        phrase(6, "I wake up at 7 AM.", "Tôi thức dậy lúc 7 giờ sáng.", "/aɪ weɪk ʌp æt ˈsɛvən eɪ ɛm/", Easy,
          &["Phát âm 'wake' thành 'work'"]),
        phrase(7, "I have breakfast with my family.", "Tôi ăn sáng cùng gia đình.", "/aɪ hæv ˈbrɛkfəst wɪθ maɪ ˈfæməli/", Medium,
          &["Âm /θ/ trong 'with'", "Phát âm 'breakfast'"]),
        phrase(8, "I go to work by motorbike.", "Tôi đi làm bằng xe máy.", "/aɪ goʊ tu wɜrk baɪ ˈmoʊtərˌbaɪk/", Medium,
          &["Nối âm 'go to'", "Trọng âm 'motorbike'"]),
        phrase(9, "I finish work at 5 PM.", "Tôi tan làm lúc 5 giờ chiều.", "/aɪ ˈfɪnɪʃ wɜrk æt faɪv pi ɛm/", Easy,
          &["Âm /ʃ/ cuối 'finish'"]),
        phrase(10, "I watch TV after dinner.", "Tôi xem TV sau bữa tối.", "/aɪ wɑtʃ ti vi ˈæftər ˈdɪnər/", Medium,
          &["Phát âm 'watch' vs 'wash'", "Âm /r/ cuối 'after'"]),
      ],
      cultural_context: Some("Người phương Tây thường có lịch trình cố định và đúng giờ hơn. Việc nói về thời gian cụ thể rất quan trọng trong giao tiếp.".into()),
      vietnamese_challenges: vec![
        "Thì hiện tại đơn với 'I' không cần chia động từ".into(),
        "Giới từ thời gian: 'at' cho giờ, 'on' cho ngày".into(),
        "Âm cuối phải phát âm rõ ràng".into(),
      ],
    },

    Lesson {
      lesson_id: "day_3_food_ordering".into(),
      level: "A2".into(),
      topic: "Ordering Food".into(),
      intro_vi: "Học cách gọi món ăn tại nhà hàng! Những câu này rất hữu ích khi bạn du lịch hoặc ăn tại các nhà hàng quốc tế.".into(),
      target_phrases: vec![
        phrase(11, "Can I see the menu, please?", "Cho tôi xem thực đơn được không?", "/kæn aɪ si ðə ˈmɛnju pliz/", Medium,
          &["Âm /θ/ trong 'the'", "Intonation câu hỏi"]),
        phrase(12, "I'd like to order pho.", "Tôi muốn gọi phở.", "/aɪd laɪk tu ˈɔrdər foʊ/", Easy,
          &["Rút gọn 'I would'", "Phát âm 'pho'"]),
        phrase(13, "How spicy is this dish?", "Món này cay cỡ nào?", "/haʊ ˈspaɪsi ɪz ðɪs dɪʃ/", Medium,
          &["Âm /aɪ/ trong 'spicy'", "Âm /ʃ/ cuối 'dish'"]),
        phrase(14, "The bill, please.", "Tính tiền, xin lỗi.", "/ðə bɪl pliz/", Easy,
          &["Âm /θ/ trong 'the'"]),
        phrase(15, "This food is delicious!", "Món ăn này ngon quá!", "/ðɪs fud ɪz dɪˈlɪʃəs/", Medium,
          &["Trọng âm 'delicious'", "Âm /ʃ/ trong 'delicious'"]),
      ],
      cultural_context: Some("Ở phương Tây, khách hàng thường được phục vụ nhanh chóng và không cần gọi 'anh chị ơi' như ở Việt Nam. Chỉ cần nói 'excuse me' là đủ.".into()),
      vietnamese_challenges: vec![
        "Câu hỏi lịch sự với 'Can I...?' 'Could you...?'".into(),
        "Cách rút gọn 'I would' thành 'I'd'".into(),
        "Intonation đi lên ở cuối câu hỏi".into(),
      ],
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_lessons_are_well_formed() {
    let lessons = builtin_lessons();
    assert_eq!(lessons.len(), 3);
    for lesson in &lessons {
      assert!(!lesson.lesson_id.is_empty());
      assert!(!lesson.intro_vi.is_empty());
      assert_eq!(lesson.target_phrases.len(), 5);
    }
  }

  #[test]
  fn phrase_ids_are_unique_across_the_catalog() {
    let mut seen = std::collections::HashSet::new();
    for lesson in builtin_lessons() {
      for p in lesson.target_phrases {
        assert!(seen.insert(p.id), "duplicate phrase id {}", p.id);
      }
    }
  }
}
