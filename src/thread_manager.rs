use log::info;
pub type TaskID = i32;

/// A unit of work driven one step at a time on its own thread.
pub trait SteppableTask: Send + 'static {
    /// Runs one step. Returning `false` ends the task.
    fn step(&mut self) -> bool;

    /// Called once on the task thread after the last step, whether the task
    /// ended itself or was told to stop.
    fn finish(&mut self) {}
}

pub struct ThreadManager {
    current_task_id: TaskID,
    tasks: std::collections::HashMap<TaskID, ManagedTask>,
}

impl ThreadManager {
    #[must_use]
    pub fn new() -> Self {
        ThreadManager {
            current_task_id: 0,
            tasks: std::collections::HashMap::new(),
        }
    }

    /// Spawns a named thread that steps `task` until it returns `false` or
    /// [`ThreadManager::stop_all_tasks`] is called, then runs its `finish` hook.
    ///
    /// The stop signal is checked between steps, so a step should block for
    /// a bounded time.
    pub fn add_task<T>(&mut self, task: T, name: &str) -> Result<TaskID, std::io::Error>
    where
        T: SteppableTask,
    {
        let id = self.current_task_id;
        let (stop_sender, stop_receiver) = crossbeam_channel::bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_task_until_stopped(task, &stop_receiver))?;

        self.tasks.insert(
            id,
            ManagedTask {
                handle,
                stop_sender,
            },
        );
        self.current_task_id += 1;
        Ok(id)
    }

    pub fn stop_all_tasks(&self) {
        info!("ThreadManager: Signaling all tasks to stop...");
        for task in self.tasks.values() {
            let _ = task.stop_sender.try_send(());
        }
    }

    pub fn wait_on_task_finish(&mut self, task_id: TaskID) {
        if let Some(task) = self.tasks.remove(&task_id)
            && task.handle.join().is_err()
        {
            log::error!("ThreadManager: task {task_id} panicked");
        }
    }
}

impl Default for ThreadManager {
    fn default() -> Self {
        ThreadManager::new()
    }
}

fn run_task_until_stopped<T: SteppableTask>(
    mut task: T,
    stop_receiver: &crossbeam_channel::Receiver<()>,
) {
    loop {
        match stop_receiver.try_recv() {
            Ok(()) | Err(crossbeam_channel::TryRecvError::Disconnected) => break,
            Err(crossbeam_channel::TryRecvError::Empty) => {}
        }

        if !task.step() {
            break;
        }

        std::thread::yield_now();
    }
    task.finish();
}

struct ManagedTask {
    handle: std::thread::JoinHandle<()>,
    stop_sender: crossbeam_channel::Sender<()>,
}
