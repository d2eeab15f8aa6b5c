/// Single-line editor; the cursor is a byte offset kept on a char boundary.
#[derive(Debug, Default, Clone)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        while self.cursor > 0 && !self.text.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    pub fn right(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        self.cursor += 1;
        while self.cursor < self.text.len() && !self.text.is_char_boundary(self.cursor) {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut prev = self.cursor - 1;
        while prev > 0 && !self.text.is_char_boundary(prev) {
            prev -= 1;
        }
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        let mut end = self.cursor + 1;
        while end < self.text.len() && !self.text.is_char_boundary(end) {
            end += 1;
        }
        self.text.drain(self.cursor..end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> InputLine {
        let mut line = InputLine::default();
        s.chars().for_each(|c| line.insert(c));
        line
    }

    #[test]
    fn editing_multibyte_text_keeps_boundaries() {
        let mut line = typed("날씨x");
        line.left();
        line.left();
        assert_eq!(line.cursor(), "날".len());

        line.backspace();
        assert_eq!(line.text(), "씨x");
        assert_eq!(line.cursor(), 0);

        line.right();
        line.delete();
        assert_eq!(line.text(), "씨");
    }

    #[test]
    fn take_resets_cursor() {
        let mut line = typed("rust");
        line.home();
        line.insert('>');
        assert_eq!(line.take(), ">rust");
        assert_eq!(line.text(), "");
        assert_eq!(line.cursor(), 0);
        line.end();
        line.backspace();
        assert_eq!(line.cursor(), 0);
    }
}
