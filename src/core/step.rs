use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::item::{ItemProcessor, ItemReader, ItemWriter};

/// Status of a chunk read from the reader.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ChunkStatus {
    /// The chunk holds `chunk_size` items and more may follow.
    Full,
    /// The reader is exhausted.
    Finished,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
}

/// Bookkeeping for one run of a step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of errors encountered during reading
    pub read_error_count: usize,
    /// Number of errors encountered during processing
    pub process_error_count: usize,
    /// Number of errors encountered during writing
    pub write_error_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::default(),
            read_count: 0,
            write_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
        }
    }
}

pub trait Step {
    /// Executes the step.
    ///
    /// This method represents the main operation of the step. Counters and
    /// timing are recorded on `step_execution` whatever the outcome.
    ///
    /// # Returns
    /// - `Ok(())`: The step completed successfully
    /// - `Err(BatchError::Step)`: The step failed
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    fn get_name(&self) -> &str;
}

#[derive(Debug, PartialEq)]
pub enum RepeatStatus {
    /// The tasklet can continue to execute.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// A single unit of work run by a [`TaskletStep`].
pub trait Tasklet {
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError>;
}

pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl Step for TaskletStep<'_> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let result = loop {
            match self.tasklet.execute(step_execution) {
                Ok(RepeatStatus::Continuable) => continue,
                Ok(RepeatStatus::Finished) => break Ok(()),
                Err(error) => break Err(error),
            }
        };

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        match result {
            Ok(()) => {
                step_execution.status = StepStatus::Success;
                Ok(())
            }
            Err(error) => {
                warn!("Tasklet failed: {}", error);
                step_execution.status = StepStatus::ProcessorError;
                Err(BatchError::Step(self.name.clone()))
            }
        }
    }

    fn get_name(&self) -> &str {
        &self.name
    }
}

pub struct TaskletBuilder<'a> {
    name: String,
    tasklet: Option<&'a dyn Tasklet>,
}

impl<'a> TaskletBuilder<'a> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasklet: None,
        }
    }

    pub fn tasklet(mut self, tasklet: &'a dyn Tasklet) -> Self {
        self.tasklet = Some(tasklet);
        self
    }

    pub fn build(self) -> Result<TaskletStep<'a>, BatchError> {
        let tasklet = self.tasklet.ok_or_else(|| {
            BatchError::Configuration("Tasklet is required for building a step".to_string())
        })?;

        Ok(TaskletStep {
            name: self.name,
            tasklet,
        })
    }
}

pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for processing items
    processor: &'a dyn ItemProcessor<I, O>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<O>,
    /// Number of items to process in each chunk
    chunk_size: u16,
    /// Maximum number of errors allowed before failing the step
    skip_limit: u16,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        Self::manage_error(self.writer.open());

        loop {
            let (read_items, chunk_status) = match self.read_chunk(step_execution) {
                Ok(chunk) => chunk,
                Err(_) => {
                    step_execution.status = StepStatus::ReadError;
                    break;
                }
            };

            let processed_items = match self.process_chunk(step_execution, &read_items) {
                Ok(items) => items,
                Err(_) => {
                    step_execution.status = StepStatus::ProcessorError;
                    break;
                }
            };

            if self.write_chunk(step_execution, &processed_items).is_err() {
                step_execution.status = StepStatus::WriteError;
                break;
            }

            if chunk_status == ChunkStatus::Finished {
                step_execution.status = StepStatus::Success;
                break;
            }
        }

        Self::manage_error(self.writer.close());

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        if StepStatus::Success == step_execution.status {
            Ok(())
        } else {
            Err(BatchError::Step(step_execution.name.clone()))
        }
    }

    fn get_name(&self) -> &str {
        &self.name
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    /// Reads a chunk of items from the reader.
    ///
    /// Stops when the chunk is full, when the reader is exhausted, or when
    /// the error skip limit is reached.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: the chunk holds `chunk_size` items
    /// - `Ok((items, ChunkStatus::Finished))`: there are no more items to read
    /// - `Err(BatchError)`: the skip limit was reached
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size as usize);

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    step_execution.read_count += 1;

                    if read_items.len() >= self.chunk_size as usize {
                        debug!("End reading chunk: FULL");
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(error) => {
                    warn!("Error reading item: {}", error);
                    step_execution.read_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        return Err(error);
                    }
                }
            }
        }
    }

    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());
        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            match self.processor.process(item) {
                Ok(processed_item) => result.push(processed_item),
                Err(error) => {
                    warn!("Error processing item: {}", error);
                    step_execution.process_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        return Err(error);
                    }
                }
            }
        }

        Ok(result)
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        debug!("Writing chunk of {} items", processed_items.len());

        if processed_items.is_empty() {
            debug!("No items to write, skipping write call");
            return Ok(());
        }

        // Buffered writers only report I/O failures on flush, so a chunk
        // counts as written once both calls succeed.
        match self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush())
        {
            Ok(()) => {
                step_execution.write_count += processed_items.len();
                Ok(())
            }
            Err(error) => {
                warn!("Error writing items: {}", error);
                step_execution.write_error_count += processed_items.len();

                if self.is_skip_limit_reached(step_execution) {
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    fn is_skip_limit_reached(&self, step_execution: &StepExecution) -> bool {
        step_execution.read_error_count
            + step_execution.write_error_count
            + step_execution.process_error_count
            > self.skip_limit.into()
    }

    /// Logs errors from open/flush/close without failing the step.
    fn manage_error(result: Result<(), BatchError>) {
        if let Err(error) = result {
            warn!("Non-fatal error: {}", error);
        }
    }
}

pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: u16,
    skip_limit: u16,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 10,
            skip_limit: 0,
        }
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn skip_limit(mut self, skip_limit: u16) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        let missing =
            |part: &str| BatchError::Configuration(format!("{part} is required for building a step"));

        Ok(ChunkOrientedStep {
            name: self.name,
            reader: self.reader.ok_or_else(|| missing("Reader"))?,
            processor: self.processor.ok_or_else(|| missing("Processor"))?,
            writer: self.writer.ok_or_else(|| missing("Writer"))?,
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
        })
    }
}

/// Entry point for building either kind of step.
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn tasklet<'a>(self, tasklet: &'a dyn Tasklet) -> TaskletBuilder<'a> {
        TaskletBuilder::new(&self.name).tasklet(tasklet)
    }

    pub fn chunk<'a, I, O>(self, chunk_size: u16) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::core::item::{ItemProcessorResult, ItemReaderResult, ItemWriterResult};

    struct VecReader {
        items: RefCell<Vec<Result<String, String>>>,
    }

    impl VecReader {
        fn new(items: Vec<Result<&str, &str>>) -> Self {
            let mut items: Vec<Result<String, String>> = items
                .into_iter()
                .map(|i| i.map(str::to_string).map_err(str::to_string))
                .collect();
            items.reverse();
            Self {
                items: RefCell::new(items),
            }
        }
    }

    impl ItemReader<String> for VecReader {
        fn read(&self) -> ItemReaderResult<String> {
            match self.items.borrow_mut().pop() {
                Some(Ok(item)) => Ok(Some(item)),
                Some(Err(error)) => Err(BatchError::ItemReader(error)),
                None => Ok(None),
            }
        }
    }

    struct UpperCaseProcessor;

    impl ItemProcessor<String, String> for UpperCaseProcessor {
        fn process(&self, item: &String) -> ItemProcessorResult<String> {
            Ok(item.to_uppercase())
        }
    }

    #[derive(Default)]
    struct CollectingWriter {
        items: RefCell<Vec<String>>,
        write_calls: Cell<usize>,
    }

    impl ItemWriter<String> for CollectingWriter {
        fn write(&self, items: &[String]) -> ItemWriterResult {
            self.write_calls.set(self.write_calls.get() + 1);
            self.items.borrow_mut().extend_from_slice(items);
            Ok(())
        }
    }

    struct UnflushableWriter;

    impl ItemWriter<String> for UnflushableWriter {
        fn write(&self, _items: &[String]) -> ItemWriterResult {
            Ok(())
        }

        fn flush(&self) -> ItemWriterResult {
            Err(BatchError::ItemWriter("disk full".to_string()))
        }
    }

    struct CountingTasklet {
        remaining: Cell<usize>,
    }

    impl Tasklet for CountingTasklet {
        fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
            if self.remaining.get() == 0 {
                return Ok(RepeatStatus::Finished);
            }
            self.remaining.set(self.remaining.get() - 1);
            Ok(RepeatStatus::Continuable)
        }
    }

    #[test]
    fn chunk_step_should_read_process_and_write_every_item() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![Ok("a"), Ok("b"), Ok("c")]);
        let processor = UpperCaseProcessor;
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("upper")
            .chunk(2)
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .build()?;

        let mut step_execution = StepExecution::new(step.get_name());
        step.execute(&mut step_execution)?;

        assert_eq!(step_execution.status, StepStatus::Success);
        assert_eq!(step_execution.read_count, 3);
        assert_eq!(step_execution.write_count, 3);
        assert_eq!(writer.write_calls.get(), 2);
        assert_eq!(*writer.items.borrow(), vec!["A", "B", "C"]);
        Ok(())
    }

    #[test]
    fn chunk_step_with_empty_reader_should_succeed() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![]);
        let processor = UpperCaseProcessor;
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("empty")
            .chunk(5)
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .build()?;

        let mut step_execution = StepExecution::new("empty");
        step.execute(&mut step_execution)?;

        assert_eq!(step_execution.status, StepStatus::Success);
        assert_eq!(step_execution.read_count, 0);
        assert_eq!(writer.write_calls.get(), 0);
        Ok(())
    }

    #[test]
    fn chunk_step_should_fail_when_skip_limit_is_exceeded() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![Ok("a"), Err("boom"), Ok("b")]);
        let processor = UpperCaseProcessor;
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("strict")
            .chunk(5)
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .build()?;

        let mut step_execution = StepExecution::new("strict");
        let result = step.execute(&mut step_execution);

        assert!(matches!(result, Err(BatchError::Step(name)) if name == "strict"));
        assert_eq!(step_execution.status, StepStatus::ReadError);
        assert_eq!(step_execution.read_error_count, 1);
        assert_eq!(step_execution.write_count, 0);
        Ok(())
    }

    #[test]
    fn chunk_step_should_tolerate_errors_within_skip_limit() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![Ok("a"), Err("boom"), Ok("b")]);
        let processor = UpperCaseProcessor;
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("tolerant")
            .chunk(5)
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .skip_limit(1)
            .build()?;

        let mut step_execution = StepExecution::new("tolerant");
        step.execute(&mut step_execution)?;

        assert_eq!(step_execution.read_count, 2);
        assert_eq!(step_execution.read_error_count, 1);
        assert_eq!(*writer.items.borrow(), vec!["A", "B"]);
        Ok(())
    }

    #[test]
    fn chunk_step_should_fail_when_flush_fails() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![Ok("a"), Ok("b")]);
        let processor = UpperCaseProcessor;
        let writer = UnflushableWriter;

        let step = StepBuilder::new("unflushable")
            .chunk(1)
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .build()?;

        let mut step_execution = StepExecution::new("unflushable");
        let result = step.execute(&mut step_execution);

        assert!(matches!(result, Err(BatchError::Step(_))));
        assert_eq!(step_execution.status, StepStatus::WriteError);
        assert_eq!(step_execution.write_count, 0);
        assert_eq!(step_execution.write_error_count, 1);
        Ok(())
    }

    #[test]
    fn chunk_step_should_tolerate_flush_errors_within_skip_limit() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![Ok("a")]);
        let processor = UpperCaseProcessor;
        let writer = UnflushableWriter;

        let step = StepBuilder::new("lenient")
            .chunk(1)
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .skip_limit(1)
            .build()?;

        let mut step_execution = StepExecution::new("lenient");
        step.execute(&mut step_execution)?;

        assert_eq!(step_execution.status, StepStatus::Success);
        assert_eq!(step_execution.write_error_count, 1);
        Ok(())
    }

    #[test]
    fn builder_without_writer_should_be_rejected() {
        let reader = VecReader::new(vec![]);
        let processor = UpperCaseProcessor;

        let result = StepBuilder::new("incomplete")
            .chunk::<String, String>(1)
            .reader(&reader)
            .processor(&processor)
            .build();

        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }

    #[test]
    fn tasklet_step_should_repeat_until_finished() -> Result<(), BatchError> {
        let tasklet = CountingTasklet {
            remaining: Cell::new(3),
        };

        let step = StepBuilder::new("count").tasklet(&tasklet).build()?;
        let mut step_execution = StepExecution::new("count");
        step.execute(&mut step_execution)?;

        assert_eq!(tasklet.remaining.get(), 0);
        assert_eq!(step_execution.status, StepStatus::Success);
        Ok(())
    }
}
